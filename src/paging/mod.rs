//! Paging primitives
//!
//! Shared vocabulary of both pagers: what a caller asks for
//! ([`LoadParams`]), what it gets back ([`Page`]), and the snapshot of pages
//! already handed out ([`PagingState`]).
//!
//! Keys are generic: the remote-only pager uses 1-based server page numbers,
//! the local reader uses row offsets.

mod types;

pub use types::{LoadParams, Page, PageResult, PagingConfig, PagingState, DEFAULT_PAGE_SIZE};
