//! Seed Data
//!
//! Records every fresh service starts with. Post authors reference user ids
//! up to 14 while only users 1-10 exist, so a few posts dangle from the
//! start.

use crate::model::{Post, User};

const SEED_USERS: &[(u64, &str, &str, &str)] = &[
    (1, "Leanne Graham", "Bret", "Sincere@april.biz"),
    (2, "Ervin Howell", "Antonette", "Shanna@melissa.tv"),
    (3, "Clementine Bauch", "Samantha", "Nathan@yesenia.net"),
    (4, "Patricia Lebsack", "Karianne", "Julianne.OConner@kory.org"),
    (5, "Chelsey Dietrich", "Kamren", "Lucio_Hettinger@annie.ca"),
    (6, "Mrs. Dennis Schulist", "Leopoldo_Corkery", "Karley_Dach@jasper.info"),
    (7, "Kurtis Weissnat", "Elwyn.Skiles", "Telly.Hoeger@billy.biz"),
    (8, "Nicholas Runolfsdottir V", "Maxime_Nienow", "Sherwood@rosamond.me"),
    (9, "Glenna Reichert", "Delphine", "Chaim_McDermott@dana.io"),
    (10, "Clementina DuBuque", "Moriah.Stanton", "Rey.Padberg@karina.biz"),
];

const SEED_POSTS: &[(u64, u64, &str)] = &[
    (1, 1, "sunt aut facere repellat provident occaecati excepturi optio reprehenderit"),
    (2, 1, "qui est esse"),
    (3, 2, "ea molestias quasi exercitationem repellat qui ipsa sit aut"),
    (4, 3, "eum et est occaecati"),
    (5, 4, "nesciunt quas odio"),
    (6, 5, "dolorem eum magni eos aperiam quia"),
    (7, 6, "magnam facilis autem"),
    (8, 7, "dolorem dolore est ipsam"),
    (9, 8, "nesciunt iure omnis dolorem tempora et accusantium"),
    (10, 9, "optio molestias id quia eum"),
    (11, 10, "et ea vero quia laudantium autem"),
    (12, 11, "in quibusdam tempore odit est dolorem"),
    (13, 12, "dolorum ut in voluptas mollitia et saepe quo animi"),
    (14, 13, "voluptatem eligendi optio"),
    (15, 14, "eveniet quod temporibus"),
];

/// Seed users, ids 1-10.
pub fn users() -> Vec<User> {
    SEED_USERS
        .iter()
        .map(|&(id, name, username, email)| User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
        })
        .collect()
}

/// Seed posts, ids 1-15.
pub fn posts() -> Vec<Post> {
    SEED_POSTS
        .iter()
        .map(|&(id, user_id, title)| Post {
            id,
            user_id,
            title: title.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_users_are_unique() {
        let users = users();
        let emails: HashSet<String> = users.iter().map(|u| u.email.to_lowercase()).collect();
        let usernames: HashSet<String> =
            users.iter().map(|u| u.username.to_lowercase()).collect();

        assert_eq!(users.len(), 10);
        assert_eq!(emails.len(), users.len());
        assert_eq!(usernames.len(), users.len());
    }

    #[test]
    fn test_seed_posts_ids() {
        let ids: Vec<u64> = posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());
    }
}
