//! List Controller
//!
//! TigerStyle: Local list state over a remotely held collection.
//!
//! The controller keeps the last fetched collection plus UI state (search
//! text, current page, selection, pending delete confirmation) and derives
//! the visible page from them. Every mutation is sent first and only
//! followed by a full refetch once it succeeds; local form data is never
//! merged into the list.
//!
//! Flow for deletes:
//! 1. `request_delete` / `request_bulk_delete` arms a confirmation
//! 2. `confirm_delete` executes it (or `cancel_delete` drops it)
//! 3. On success the collection is refetched once
//!
//! Nothing is retried. Every failure ends the operation and is shown as a
//! flat error banner.

use std::collections::BTreeSet;

use futures::future::join_all;

use crate::client::{ClientError, RecordApi};
use crate::listing::{self, PageRange};
use crate::model::{Entity, UserDirectory};
use crate::PAGE_SIZE;

// =============================================================================
// Types
// =============================================================================

/// A delete awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingDelete {
    /// One record
    Single(u64),
    /// Every currently selected record
    Bulk,
}

/// Transient success message shown after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// List Controller
// =============================================================================

/// Search, pagination, selection and mutations for one entity list.
pub struct ListController<E: Entity, A: RecordApi<E>> {
    /// Remote collection access
    api: A,
    /// Last successfully fetched collection
    records: Option<Vec<E>>,
    /// Fetch in flight
    loading: bool,
    /// Last fetch failure
    fetch_error: Option<String>,
    /// Last mutation failure
    error: Option<String>,
    /// Last mutation success
    notice: Option<Notice>,
    /// Search text as typed
    search: String,
    /// Current page, 1-based
    page: usize,
    /// Selected record ids
    selection: BTreeSet<u64>,
    /// Delete awaiting confirmation
    pending_delete: Option<PendingDelete>,
    /// Author names for post search
    directory: UserDirectory,
}

impl<E: Entity, A: RecordApi<E>> ListController<E, A> {
    /// Create a controller with nothing fetched yet.
    pub fn new(api: A) -> Self {
        Self {
            api,
            records: None,
            loading: false,
            fetch_error: None,
            error: None,
            notice: None,
            search: String::new(),
            page: 1,
            selection: BTreeSet::new(),
            pending_delete: None,
            directory: UserDirectory::default(),
        }
    }

    /// The underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Fetch the full collection and apply the result.
    ///
    /// On failure the previously fetched records stay in place.
    pub async fn refetch(&mut self) -> Result<(), ClientError> {
        self.begin_fetch();
        let result = self.api.fetch_all().await;
        self.finish_fetch(result)
    }

    /// Mark a fetch as in flight.
    ///
    /// Paired with `finish_fetch` when the caller drives the request itself.
    /// Nothing de-duplicates concurrent fetches: whichever result is
    /// finished last is what the list shows.
    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.fetch_error = None;
    }

    /// Apply a fetch result.
    pub fn finish_fetch(&mut self, result: Result<Vec<E>, ClientError>) -> Result<(), ClientError> {
        self.loading = false;
        match result {
            Ok(records) => {
                tracing::debug!(kind = E::KIND, count = records.len(), "fetched records");
                self.records = Some(records);
                self.page = self.page.min(self.total_pages());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = E::KIND, error = %e, "fetch failed");
                self.fetch_error = Some(e.message.clone());
                Err(e)
            }
        }
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether any collection has been fetched.
    pub fn has_data(&self) -> bool {
        self.records.is_some()
    }

    /// The fetched collection (empty before the first fetch).
    pub fn records(&self) -> &[E] {
        self.records.as_deref().unwrap_or(&[])
    }

    /// Replace the author directory used by search.
    pub fn set_directory(&mut self, directory: UserDirectory) {
        self.directory = directory;
    }

    /// The author directory.
    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    // -------------------------------------------------------------------------
    // Search & Pagination
    // -------------------------------------------------------------------------

    /// Current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Change the search text and go back to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Records matching the search, in collection order.
    pub fn filtered(&self) -> Vec<&E> {
        listing::filter(self.records(), &self.search, &self.directory)
    }

    /// Records on the current page.
    pub fn page_items(&self) -> Vec<&E> {
        listing::paginate(&self.filtered(), self.page, PAGE_SIZE).to_vec()
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Page count over the filtered records, at least 1.
    pub fn total_pages(&self) -> usize {
        listing::total_pages(self.filtered().len(), PAGE_SIZE)
    }

    /// Jump to a page, clamped to the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Step forward one page, stopping at the last.
    pub fn next_page(&mut self) {
        self.set_page(self.page.saturating_add(1));
    }

    /// Step back one page, stopping at the first.
    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    /// Position of the current page, for "Showing X to Y of N".
    pub fn page_range(&self) -> PageRange {
        PageRange::new(self.page, PAGE_SIZE, self.filtered().len())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Selected ids.
    pub fn selection(&self) -> &BTreeSet<u64> {
        &self.selection
    }

    /// Check if an id is selected.
    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.contains(&id)
    }

    /// Add or remove one id.
    pub fn toggle_selection(&mut self, id: u64) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    /// Whether the selection exactly covers the visible page.
    ///
    /// Derived from sizes only: a selection made on another page of the
    /// same size also counts.
    pub fn is_all_selected(&self) -> bool {
        let visible = self.page_items().len();
        visible > 0 && self.selection.len() == visible
    }

    /// Clear the selection if it covers the page, otherwise select exactly
    /// the visible page.
    pub fn toggle_select_all(&mut self) {
        let visible: Vec<u64> = self.page_items().iter().map(|r| r.id()).collect();
        if self.selection.len() == visible.len() {
            self.selection.clear();
        } else {
            self.selection = visible.into_iter().collect();
        }
    }

    // -------------------------------------------------------------------------
    // Deletes
    // -------------------------------------------------------------------------

    /// Arm confirmation for deleting one record.
    pub fn request_delete(&mut self, id: u64) {
        self.pending_delete = Some(PendingDelete::Single(id));
    }

    /// Arm confirmation for deleting the selection.
    ///
    /// Returns false (and arms nothing) when the selection is empty.
    pub fn request_bulk_delete(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.pending_delete = Some(PendingDelete::Bulk);
        true
    }

    /// Drop the pending confirmation.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// The delete awaiting confirmation.
    pub fn pending_delete(&self) -> Option<PendingDelete> {
        self.pending_delete
    }

    /// Question to put to the user for the pending delete.
    pub fn confirmation_prompt(&self) -> Option<String> {
        let prompt = match self.pending_delete? {
            PendingDelete::Single(_) => format!(
                "Are you sure you want to delete this {}? This action cannot be undone.",
                E::NOUN
            ),
            PendingDelete::Bulk => format!(
                "Are you sure you want to delete {} selected {}? This action cannot be undone.",
                self.selection.len(),
                E::COLLECTION
            ),
        };
        Some(prompt)
    }

    /// Execute the pending delete.
    ///
    /// A bulk delete issues every request concurrently and succeeds only if
    /// all of them do. On failure some deletes may already have landed;
    /// the selection and the pending confirmation are left as they were.
    pub async fn confirm_delete(&mut self) -> Result<(), ClientError> {
        let Some(pending) = self.pending_delete else {
            return Ok(());
        };

        let outcome = match pending {
            PendingDelete::Single(id) => self.api.delete(id).await.map(|()| 1),
            PendingDelete::Bulk => {
                let ids: Vec<u64> = self.selection.iter().copied().collect();
                let results = join_all(ids.iter().map(|&id| self.api.delete(id))).await;
                results
                    .into_iter()
                    .collect::<Result<Vec<()>, ClientError>>()
                    .map(|done| done.len())
            }
        };

        let count = match outcome {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(kind = E::KIND, error = %e, "delete failed");
                let err = ClientError::new(format!("Failed to delete {}(s)", E::NOUN));
                self.error = Some(err.message.clone());
                return Err(err);
            }
        };

        if pending == PendingDelete::Bulk {
            self.selection.clear();
        }
        // A failed refetch keeps the stale list and sets the fetch error.
        let _ = self.refetch().await;
        self.pending_delete = None;

        let message = match pending {
            PendingDelete::Single(_) => format!("{} deleted successfully!", E::KIND),
            PendingDelete::Bulk => format!("{count} {} deleted successfully!", E::COLLECTION),
        };
        tracing::info!(kind = E::KIND, count, "deleted records");
        self.notice = Some(Notice::new(message));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Create & Update
    // -------------------------------------------------------------------------

    /// Send a new record, then refetch on success.
    pub async fn create(&mut self, draft: E::Draft) -> Result<E, ClientError> {
        let record = match self.api.create(&draft).await {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };

        let _ = self.refetch().await;
        self.error = None;
        self.notice = Some(Notice::new(format!("{} created successfully!", E::KIND)));
        Ok(record)
    }

    /// Send a patch, then refetch on success.
    pub async fn update(&mut self, id: u64, patch: E::Patch) -> Result<E, ClientError> {
        let record = match self.api.update(id, &patch).await {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };

        let _ = self.refetch().await;
        self.error = None;
        self.notice = Some(Notice::new(format!("{} updated successfully!", E::KIND)));
        Ok(record)
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        tracing::warn!(kind = E::KIND, error = %err, "mutation failed");
        self.error = Some(err.message.clone());
        err
    }

    // -------------------------------------------------------------------------
    // Banners
    // -------------------------------------------------------------------------

    /// Last fetch failure.
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Last mutation failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last mutation success.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hide the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Hide the success notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, Post, User, UserPatch};
    use crate::seed;
    use crate::store::RecordStore;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio_test::{assert_err, assert_ok};

    /// In-memory stand-in for the remote service.
    struct FakeApi<E: Entity> {
        store: Mutex<RecordStore<E>>,
        failing_deletes: Mutex<HashSet<u64>>,
        fail_fetch: AtomicBool,
        fail_mutations: AtomicBool,
        fetches: AtomicUsize,
        deletes: AtomicUsize,
        /// When set, every delete waits here before completing
        delete_barrier: Mutex<Option<Arc<Barrier>>>,
    }

    impl<E: Entity> FakeApi<E> {
        fn new(records: Vec<E>) -> Self {
            Self {
                store: Mutex::new(RecordStore::with_seed(records)),
                failing_deletes: Mutex::new(HashSet::new()),
                fail_fetch: AtomicBool::new(false),
                fail_mutations: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
                delete_barrier: Mutex::new(None),
            }
        }

        fn len(&self) -> usize {
            self.store.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl<E: Entity> RecordApi<E> for FakeApi<E> {
        async fn fetch_all(&self) -> Result<Vec<E>, ClientError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(ClientError::new(format!("Failed to fetch {}", E::COLLECTION)));
            }
            Ok(self.store.lock().unwrap().list())
        }

        async fn create(&self, draft: &E::Draft) -> Result<E, ClientError> {
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(ClientError::new("Email taken@example.com is already in use"));
            }
            Ok(self.store.lock().unwrap().insert(draft.clone()))
        }

        async fn update(&self, id: u64, patch: &E::Patch) -> Result<E, ClientError> {
            self.store
                .lock()
                .unwrap()
                .replace(id, patch.clone())
                .map_err(|e| ClientError::new(e.to_string()))
        }

        async fn delete(&self, id: u64) -> Result<(), ClientError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            let barrier = self.delete_barrier.lock().unwrap().clone();
            if let Some(barrier) = barrier {
                barrier.wait().await;
            }
            if self.failing_deletes.lock().unwrap().contains(&id) {
                return Err(ClientError::new("Failed to delete user"));
            }
            self.store
                .lock()
                .unwrap()
                .delete(id)
                .map(|_| ())
                .map_err(|e| ClientError::new(e.to_string()))
        }
    }

    fn user(id: u64) -> User {
        User {
            id,
            name: format!("Name {id}"),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
        }
    }

    async fn users_controller(count: u64) -> ListController<User, FakeApi<User>> {
        let mut controller = ListController::new(FakeApi::new((1..=count).map(user).collect()));
        assert_ok!(controller.refetch().await);
        controller
    }

    #[tokio::test]
    async fn test_initial_fetch() {
        let mut controller: ListController<User, _> =
            ListController::new(FakeApi::new(seed::users()));
        assert!(!controller.has_data());
        assert!(!controller.is_loading());

        assert_ok!(controller.refetch().await);

        assert!(controller.has_data());
        assert!(!controller.is_loading());
        assert_eq!(controller.records().len(), 10);
        assert_eq!(controller.total_pages(), 1);
    }

    #[tokio::test]
    async fn test_search_resets_page() {
        let mut controller = users_controller(25).await;
        controller.set_page(3);
        assert_eq!(controller.page(), 3);

        controller.set_search("Name 1");

        assert_eq!(controller.page(), 1);
        // "Name 1", "Name 10".."Name 19"
        assert_eq!(controller.filtered().len(), 11);
        assert_eq!(controller.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_set_page_clamps() {
        let mut controller = users_controller(25).await;

        controller.set_page(99);
        assert_eq!(controller.page(), 3);
        assert_eq!(controller.page_items().len(), 5);

        controller.next_page();
        assert_eq!(controller.page(), 3);

        controller.set_page(0);
        assert_eq!(controller.page(), 1);
        controller.prev_page();
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.page_range().to_string(), "Showing 1 to 10 of 25");
    }

    #[tokio::test]
    async fn test_select_all_toggles_visible_page() {
        let mut controller = users_controller(15).await;

        controller.toggle_select_all();
        assert!(controller.is_all_selected());
        assert_eq!(controller.selection().len(), 10);

        controller.toggle_select_all();
        assert!(controller.selection().is_empty());

        controller.toggle_selection(3);
        controller.toggle_select_all();
        assert_eq!(controller.selection().len(), 10);
        assert!(controller.is_selected(3));
    }

    #[tokio::test]
    async fn test_select_all_does_not_carry_across_pages() {
        let mut controller = users_controller(15).await;
        controller.toggle_select_all();

        controller.set_page(2);

        // Ten selected from page 1, five visible on page 2.
        assert!(!controller.is_all_selected());
        controller.toggle_select_all();
        let selected: Vec<u64> = controller.selection().iter().copied().collect();
        assert_eq!(selected, vec![11, 12, 13, 14, 15]);
    }

    #[tokio::test]
    async fn test_single_delete_requires_confirmation() {
        let mut controller = users_controller(5).await;

        controller.request_delete(2);
        assert_eq!(controller.pending_delete(), Some(PendingDelete::Single(2)));
        assert_eq!(
            controller.confirmation_prompt().as_deref(),
            Some("Are you sure you want to delete this user? This action cannot be undone.")
        );
        controller.cancel_delete();
        assert_ok!(controller.confirm_delete().await);
        assert_eq!(controller.api().deletes.load(Ordering::SeqCst), 0);

        controller.request_delete(2);
        assert_ok!(controller.confirm_delete().await);

        assert_eq!(controller.records().len(), 4);
        assert_eq!(controller.pending_delete(), None);
        assert_eq!(
            controller.notice().map(|n| n.message.as_str()),
            Some("User deleted successfully!")
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_two_of_five() {
        let mut controller = users_controller(5).await;
        let fetches_before = controller.api().fetches.load(Ordering::SeqCst);
        controller.toggle_selection(2);
        controller.toggle_selection(3);

        assert!(controller.request_bulk_delete());
        assert_eq!(
            controller.confirmation_prompt().as_deref(),
            Some("Are you sure you want to delete 2 selected users? This action cannot be undone.")
        );
        assert_ok!(controller.confirm_delete().await);

        assert_eq!(controller.records().len(), 3);
        assert!(controller.selection().is_empty());
        assert_eq!(controller.api().deletes.load(Ordering::SeqCst), 2);
        assert_eq!(controller.api().fetches.load(Ordering::SeqCst), fetches_before + 1);
        assert_eq!(
            controller.notice().map(|n| n.message.as_str()),
            Some("2 users deleted successfully!")
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_requests_run_concurrently() {
        let mut controller = users_controller(5).await;
        // No delete finishes until all three are in flight.
        *controller.api().delete_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(3)));
        controller.toggle_selection(1);
        controller.toggle_selection(2);
        controller.toggle_selection(4);
        assert!(controller.request_bulk_delete());

        let outcome =
            tokio::time::timeout(Duration::from_secs(2), controller.confirm_delete()).await;

        assert_ok!(assert_ok!(outcome));
        assert_eq!(controller.records().len(), 2);
        assert!(controller.selection().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_delete_with_empty_selection_is_noop() {
        let mut controller = users_controller(5).await;

        assert!(!controller.request_bulk_delete());
        assert_eq!(controller.pending_delete(), None);
    }

    #[tokio::test]
    async fn test_bulk_delete_partial_failure_reports_failure() {
        let mut controller = users_controller(5).await;
        controller.api().failing_deletes.lock().unwrap().insert(3);
        controller.toggle_selection(2);
        controller.toggle_selection(3);
        controller.request_bulk_delete();

        let err = assert_err!(controller.confirm_delete().await);

        assert_eq!(err.message, "Failed to delete user(s)");
        assert_eq!(controller.error(), Some("Failed to delete user(s)"));
        // Selection untouched, no refetch, yet id 2 is already gone remotely.
        assert_eq!(controller.selection().len(), 2);
        assert_eq!(controller.pending_delete(), Some(PendingDelete::Bulk));
        assert_eq!(controller.records().len(), 5);
        assert_eq!(controller.api().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_stale_records() {
        let mut controller = users_controller(5).await;
        controller.api().fail_fetch.store(true, Ordering::SeqCst);

        controller.request_delete(1);
        assert_ok!(controller.confirm_delete().await);

        assert_eq!(controller.records().len(), 5);
        assert_eq!(controller.fetch_error(), Some("Failed to fetch users"));
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_delete_missing_record_fails() {
        let mut controller = users_controller(5).await;

        controller.request_delete(42);
        assert_err!(controller.confirm_delete().await);

        assert_eq!(controller.api().len(), 5);
        assert_eq!(controller.error(), Some("Failed to delete user(s)"));
    }

    #[tokio::test]
    async fn test_create_refetches_authoritative_list() {
        let mut controller = users_controller(5).await;

        let created = assert_ok!(
            controller
                .create(NewUser {
                    name: "Ada".to_string(),
                    username: "ada".to_string(),
                    email: "ada@example.com".to_string(),
                })
                .await
        );

        assert_eq!(created.id, 6);
        assert_eq!(controller.records().len(), 6);
        assert_eq!(
            controller.notice().map(|n| n.message.as_str()),
            Some("User created successfully!")
        );
    }

    #[tokio::test]
    async fn test_create_failure_leaves_list_and_shows_message() {
        let mut controller = users_controller(5).await;
        controller.api().fail_mutations.store(true, Ordering::SeqCst);
        let fetches_before = controller.api().fetches.load(Ordering::SeqCst);

        let err = assert_err!(
            controller
                .create(NewUser {
                    name: "Ada".to_string(),
                    username: "ada".to_string(),
                    email: "taken@example.com".to_string(),
                })
                .await
        );

        assert_eq!(controller.error(), Some(err.message.as_str()));
        assert_eq!(controller.records().len(), 5);
        assert_eq!(controller.api().fetches.load(Ordering::SeqCst), fetches_before);

        controller.dismiss_error();
        assert_eq!(controller.error(), None);
    }

    #[tokio::test]
    async fn test_update_refetches() {
        let mut controller = users_controller(5).await;

        let patch = UserPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert_ok!(controller.update(4, patch).await);

        assert_eq!(controller.records()[3].name, "Renamed");
        controller.dismiss_notice();
        assert!(controller.notice().is_none());
    }

    #[tokio::test]
    async fn test_last_finished_fetch_wins() {
        let mut controller = users_controller(5).await;

        controller.begin_fetch();
        assert!(controller.is_loading());
        let older = Ok((1..=2).map(user).collect());
        let newer = Ok((1..=7).map(user).collect());

        // Responses arrive out of issue order.
        assert_ok!(controller.finish_fetch(newer));
        assert_ok!(controller.finish_fetch(older));

        assert_eq!(controller.records().len(), 2);
    }

    #[tokio::test]
    async fn test_post_search_uses_directory() {
        let mut controller: ListController<Post, _> =
            ListController::new(FakeApi::new(seed::posts()));
        assert_ok!(controller.refetch().await);
        controller.set_directory(UserDirectory::from_users(&seed::users()));

        controller.set_search("leanne");

        let ids: Vec<u64> = controller.page_items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);

        controller.set_search("");
        controller.set_page(2);
        let ids: Vec<u64> = controller.page_items().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
    }
}
