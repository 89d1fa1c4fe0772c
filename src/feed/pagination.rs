// Pagination wrapper shared by the recommendation feed and the
// recent-posts listing.

use crate::error::FeedError;

/// Number of pages needed for `total_items` at `page_size` per page.
/// Zero items still make one (empty) page.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if total_items == 0 {
        1
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Slice one page out of a full item list.
///
/// With no page requested, the whole list comes back as a single page.
/// A requested page beyond the last (or page 0) fails with `InvalidPage`.
pub fn paginate<T: Clone>(
    items: &[T],
    page: Option<usize>,
    page_size: usize,
) -> Result<(Vec<T>, usize), FeedError> {
    let Some(page) = page else {
        return Ok((items.to_vec(), 1));
    };

    let total_pages = total_pages(items.len(), page_size);
    if page == 0 || page > total_pages {
        return Err(FeedError::InvalidPage { page, total_pages });
    }

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Ok((items[start..end].to_vec(), total_pages))
}
