// File: ./src/board.rs
//! Dashboard task list: one cached page plus the rules for keeping it in
//! step with the server's pagination.
//!
//! Fetches are split into `begin_load` (issues a ticket) and `finish_load`
//! (applies a result) so that the caller can run the request anywhere,
//! including concurrently. Only the most recently issued ticket may change
//! what is displayed.
use crate::client::ApiClient;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::ApiError;
use crate::model::{Task, TaskPage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// What to do with the local list after a task was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePlacement {
    /// Prepend locally, no request.
    Prepend,
    /// Prepend locally and also fetch the next page, because the list was already full.
    RefetchNext,
}

/// `list_len` is the length before the new task is added.
pub fn placement_after_create(list_len: usize, page_size: u32) -> CreatePlacement {
    if list_len >= page_size as usize {
        CreatePlacement::RefetchNext
    } else {
        CreatePlacement::Prepend
    }
}

/// A page fetch to perform. `seq` must be handed back to [`TaskBoard::finish_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct TaskBoard {
    tasks: Vec<Task>,
    current_page: u32,
    total_pages: u32,
    page_size: u32,
    state: LoadState,
    latest_seq: u64,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TaskBoard {
    pub fn new(page_size: u32) -> Self {
        Self {
            tasks: Vec::new(),
            current_page: 1,
            total_pages: 1,
            page_size: page_size.max(1),
            state: LoadState::Idle,
            latest_seq: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Pagination controls show once there is more than one page or the page is full.
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1 || self.tasks.len() >= self.page_size as usize
    }

    /// Issues a ticket for `page`. Any older ticket still in flight becomes stale.
    pub fn begin_load(&mut self, page: u32) -> PageRequest {
        self.latest_seq += 1;
        self.state = LoadState::Loading;
        PageRequest {
            seq: self.latest_seq,
            page: page.max(1),
            limit: self.page_size,
        }
    }

    /// Applies a fetch result. Returns `false` when the ticket was superseded
    /// and the result was dropped.
    ///
    /// The server's `currentPage`/`totalPages` are adopted as-is, even when
    /// they differ from the page that was asked for.
    pub fn finish_load(&mut self, seq: u64, result: Result<TaskPage, ApiError>) -> bool {
        if seq != self.latest_seq {
            log::debug!(
                "Dropping stale page response (ticket {}, latest {})",
                seq,
                self.latest_seq
            );
            return false;
        }
        match result {
            Ok(page) => {
                self.tasks = page.items;
                self.total_pages = page.total_pages.max(1);
                self.current_page = page.current_page.max(1);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                self.state = LoadState::Errored(e.to_string());
            }
        }
        true
    }

    /// Empties the board for a new session. The ticket counter keeps
    /// counting and every ticket still in flight is invalidated.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.current_page = 1;
        self.total_pages = 1;
        self.state = LoadState::Idle;
        self.latest_seq += 1;
    }

    /// The mount fetch.
    pub fn load_first(&mut self) -> PageRequest {
        self.begin_load(1)
    }

    pub fn go_to_page(&mut self, page: u32) -> PageRequest {
        self.begin_load(page)
    }

    pub fn next_page(&mut self) -> Option<PageRequest> {
        (self.current_page < self.total_pages).then(|| self.begin_load(self.current_page + 1))
    }

    pub fn previous_page(&mut self) -> Option<PageRequest> {
        (self.current_page > 1).then(|| self.begin_load(self.current_page - 1))
    }

    /// Update and delete always refetch the page currently shown.
    pub fn refresh(&mut self) -> PageRequest {
        self.begin_load(self.current_page)
    }

    /// Prepends `task`; when the list was already full, also asks for the next page.
    pub fn task_created(&mut self, task: Task) -> Option<PageRequest> {
        let placement = placement_after_create(self.tasks.len(), self.page_size);
        self.tasks.insert(0, task);
        match placement {
            CreatePlacement::Prepend => None,
            CreatePlacement::RefetchNext => Some(self.begin_load(self.current_page + 1)),
        }
    }

    pub fn task_updated(&mut self) -> PageRequest {
        self.refresh()
    }

    pub fn task_deleted(&mut self) -> PageRequest {
        self.refresh()
    }

    /// Fetches `page` and applies it in one go.
    pub async fn load(&mut self, api: &ApiClient, page: u32) -> Result<(), ApiError> {
        let req = self.begin_load(page);
        let result = api.list_tasks(req.page, req.limit).await;
        let err = result.as_ref().err().cloned();
        self.finish_load(req.seq, result);
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
