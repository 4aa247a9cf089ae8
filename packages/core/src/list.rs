//! Lazily paginated lists.
//!
//! A `list` document carries one page of items and an optional `next`
//! cursor. [`PaginatedList`] keeps every item fetched so far in an
//! append-only buffer and follows the cursor only when an index beyond the
//! buffer is requested, one page at a time.
//!
//! # Threading
//!
//! The buffer and cursor live behind `Rc<RefCell<_>>`, so a list (and any
//! [`Node`] containing one) is neither `Send` nor `Sync`. Callers that need
//! to share a document across threads must serialise access themselves,
//! e.g. by owning it on a single worker thread.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use url::Url;

use crate::error::{Error, Result};
use crate::node::Node;
use crate::transport::{self, Transport};

#[derive(Debug)]
struct ListState {
    items: Vec<Node>,
    cursor: Option<Url>,
    /// Every page URL already fetched, including the one this list was
    /// served from. A cursor pointing back at one of these would fetch a
    /// page twice.
    visited: HashSet<Url>,
}

/// A sequence whose items are spread over a chain of pages.
///
/// Clones share state: a page fetched through one handle is visible to all.
#[derive(Debug, Clone)]
pub struct PaginatedList {
    state: Rc<RefCell<ListState>>,
}

impl PaginatedList {
    /// A list holding `items` with `cursor` pointing at the next page.
    pub fn new(items: Vec<Node>, cursor: Option<Url>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ListState {
                items,
                cursor,
                visited: HashSet::new(),
            })),
        }
    }

    /// The item at `index`, fetching pages until the buffer covers it.
    ///
    /// Indices already in the buffer never touch the transport. Otherwise
    /// pages are fetched one by one from the cursor, and only as many as are
    /// needed to reach `index`.
    pub fn get<T: Transport + ?Sized>(&self, transport: &T, index: isize) -> Result<Node> {
        let index = usize::try_from(index).map_err(|_| Error::NegativeIndex(index))?;
        self.get_at(transport, index)
    }

    /// Fetch every remaining page. Returns the final item count.
    pub fn fetch_all<T: Transport + ?Sized>(&self, transport: &T) -> Result<usize> {
        while self.ensure(transport, usize::MAX)? {}
        Ok(self.fetched_len())
    }

    /// Walk every item, fetching pages as the walk reaches them.
    pub fn iter<'a, T: Transport + ?Sized>(&'a self, transport: &'a T) -> Iter<'a, T> {
        Iter {
            list: self,
            transport,
            index: 0,
            done: false,
        }
    }

    /// Number of items fetched so far.
    pub fn fetched_len(&self) -> usize {
        self.state.borrow().items.len()
    }

    /// URL of the next unfetched page, if any.
    pub fn cursor(&self) -> Option<Url> {
        self.state.borrow().cursor.clone()
    }

    /// `true` once every page has been fetched.
    pub fn is_exhausted(&self) -> bool {
        self.state.borrow().cursor.is_none()
    }

    /// Copy of the fetched items and the current cursor. Never fetches.
    pub fn snapshot(&self) -> (Vec<Node>, Option<Url>) {
        let state = self.state.borrow();
        (state.items.clone(), state.cursor.clone())
    }

    /// Record `url` as a page whose items are already in the buffer.
    pub(crate) fn mark_fetched(&self, url: Url) {
        self.state.borrow_mut().visited.insert(url);
    }

    fn get_at<T: Transport + ?Sized>(&self, transport: &T, index: usize) -> Result<Node> {
        while self.fetched_len() <= index {
            if !self.ensure(transport, index)? {
                return Err(Error::OutOfRange(index));
            }
        }
        Ok(self.state.borrow().items[index].clone())
    }

    /// Fetch and merge the next page if `index` is not yet buffered.
    ///
    /// Returns `Ok(false)` when the buffer cannot grow any further, `Ok(true)`
    /// when a page was merged or the index is already covered. On error the
    /// buffer and cursor are left as they were.
    fn ensure<T: Transport + ?Sized>(&self, transport: &T, index: usize) -> Result<bool> {
        let cursor = {
            let state = self.state.borrow();
            if index < state.items.len() {
                return Ok(true);
            }
            match &state.cursor {
                Some(cursor) => cursor.clone(),
                None => return Ok(false),
            }
        };

        let (items, next, mut seen) = match transport::get(transport, &cursor)? {
            Node::List(page) => page.into_parts(),
            other => {
                return Err(Error::MismatchedPageType {
                    url: cursor.to_string(),
                    found: other.kind(),
                })
            }
        };

        seen.insert(cursor.clone());
        let mut state = self.state.borrow_mut();
        if let Some(next) = &next {
            if seen.contains(next) || state.visited.contains(next) {
                return Err(Error::MalformedDocument(format!(
                    "list page {cursor} links back to already fetched page {next}"
                )));
            }
        }
        tracing::debug!(
            page = %cursor,
            appended = items.len(),
            more = next.is_some(),
            "merged list page"
        );
        state.visited.extend(seen);
        state.items.extend(items);
        state.cursor = next;
        Ok(true)
    }

    fn into_parts(self) -> (Vec<Node>, Option<Url>, HashSet<Url>) {
        match Rc::try_unwrap(self.state) {
            Ok(cell) => {
                let state = cell.into_inner();
                (state.items, state.cursor, state.visited)
            }
            Err(shared) => {
                let state = shared.borrow();
                (state.items.clone(), state.cursor.clone(), state.visited.clone())
            }
        }
    }
}

impl PartialEq for PaginatedList {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.state, &other.state) {
            return true;
        }
        let (a, b) = (self.state.borrow(), other.state.borrow());
        a.items == b.items && a.cursor == b.cursor
    }
}

/// Iterator returned by [`PaginatedList::iter`].
///
/// Yields `Err` once and then stops if a page fetch fails.
pub struct Iter<'a, T: ?Sized> {
    list: &'a PaginatedList,
    transport: &'a T,
    index: usize,
    done: bool,
}

impl<T: Transport + ?Sized> Iterator for Iter<'_, T> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.list.get_at(self.transport, self.index) {
            Ok(node) => {
                self.index += 1;
                Some(Ok(node))
            }
            Err(Error::OutOfRange(_)) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// --- tests -------------------------------------------------------------------
