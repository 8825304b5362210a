use serde::Serialize;

use crate::domain::paginator::Paginator;

/// Strips with at most this many pages list every page without ellipses.
const SHORT_STRIP_PAGES: usize = 5;
/// Pages shown on each side of the current one.
const WINDOW_RADIUS: usize = 2;

/// One renderable element of the pagination strip.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageToken {
    First { target_page: usize, enabled: bool },
    Previous { target_page: usize, enabled: bool },
    Page { number: usize, selected: bool },
    Ellipsis,
    Next { target_page: usize, enabled: bool },
    Last { target_page: usize, enabled: bool },
}

impl PageToken {
    /// Page a click on this token should request, if it is clickable.
    pub fn target(&self) -> Option<usize> {
        match *self {
            PageToken::First {
                target_page,
                enabled,
            }
            | PageToken::Previous {
                target_page,
                enabled,
            }
            | PageToken::Next {
                target_page,
                enabled,
            }
            | PageToken::Last {
                target_page,
                enabled,
            } => enabled.then_some(target_page),
            PageToken::Page { number, .. } => Some(number),
            PageToken::Ellipsis => None,
        }
    }
}

/// Builds the ordered token strip for the given window.
pub fn page_tokens(paginator: &Paginator) -> Vec<PageToken> {
    let total_pages = paginator.total_pages.max(1);
    let current_page = paginator.current_page.clamp(1, total_pages);

    let mut tokens = vec![
        PageToken::First {
            target_page: 1,
            enabled: paginator.has_previous,
        },
        PageToken::Previous {
            target_page: current_page.saturating_sub(1).max(1),
            enabled: paginator.has_previous,
        },
    ];

    let page = |number: usize| PageToken::Page {
        number,
        selected: number == current_page,
    };

    if total_pages <= SHORT_STRIP_PAGES {
        tokens.extend((1..=total_pages).map(page));
    } else {
        if current_page > WINDOW_RADIUS + 1 {
            tokens.push(page(1));
        }
        if current_page > WINDOW_RADIUS + 2 {
            tokens.push(PageToken::Ellipsis);
        }

        let window_start = current_page.saturating_sub(WINDOW_RADIUS).max(1);
        let window_end = current_page.saturating_add(WINDOW_RADIUS).min(total_pages);
        tokens.extend((window_start..=window_end).map(page));

        if current_page.saturating_add(3) < total_pages {
            tokens.push(PageToken::Ellipsis);
        }
    }

    tokens.push(PageToken::Next {
        target_page: current_page.saturating_add(1).min(total_pages),
        enabled: paginator.has_next,
    });
    tokens.push(PageToken::Last {
        target_page: total_pages,
        enabled: paginator.has_next,
    });

    tokens
}

/// "Showing X to Y of Z entries" caption for the window.
pub fn caption(paginator: &Paginator) -> String {
    match paginator.range() {
        Some((start, end)) => format!(
            "Showing {start} to {end} of {} entries",
            paginator.total_count
        ),
        None => format!("Showing 0 of {} entries", paginator.total_count),
    }
}

/// Page of items together with everything needed to render its strip.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub tokens: Vec<PageToken>,
    pub caption: String,
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, paginator: &Paginator) -> Self {
        Self {
            items,
            tokens: page_tokens(paginator),
            caption: caption(paginator),
            page: paginator.current_page,
            total_pages: paginator.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(current_page: usize, total_pages: usize) -> Paginator {
        Paginator {
            current_page,
            total_pages,
            records_per_page: 10,
            current_page_item_count: 10,
            total_count: total_pages * 10,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }

    fn pages(tokens: &[PageToken]) -> Vec<usize> {
        tokens
            .iter()
            .filter_map(|t| match t {
                PageToken::Page { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_page_strip_is_disabled() {
        let tokens = page_tokens(&paginator(1, 1));

        assert_eq!(
            tokens,
            vec![
                PageToken::First {
                    target_page: 1,
                    enabled: false
                },
                PageToken::Previous {
                    target_page: 1,
                    enabled: false
                },
                PageToken::Page {
                    number: 1,
                    selected: true
                },
                PageToken::Next {
                    target_page: 1,
                    enabled: false
                },
                PageToken::Last {
                    target_page: 1,
                    enabled: false
                },
            ]
        );
    }

    #[test]
    fn middle_of_long_strip_has_both_ellipses() {
        let tokens = page_tokens(&paginator(6, 20));

        assert_eq!(pages(&tokens), vec![1, 4, 5, 6, 7, 8]);
        assert_eq!(tokens[3], PageToken::Ellipsis);
        assert_eq!(tokens[tokens.len() - 3], PageToken::Ellipsis);
    }

    #[test]
    fn page_four_shows_page_one_without_ellipsis() {
        let tokens = page_tokens(&paginator(4, 10));

        assert_eq!(pages(&tokens), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            tokens
                .iter()
                .filter(|t| **t == PageToken::Ellipsis)
                .count(),
            1
        );
    }

    #[test]
    fn navigation_targets_stay_in_range() {
        let tokens = page_tokens(&paginator(10, 10));
        let next = tokens[tokens.len() - 2].clone();

        assert_eq!(
            next,
            PageToken::Next {
                target_page: 10,
                enabled: false
            }
        );
        assert_eq!(next.target(), None);
        assert_eq!(tokens[1].target(), Some(9));
    }

    #[test]
    fn caption_for_first_page() {
        let mut window = paginator(1, 3);
        window.current_page_item_count = 10;
        window.total_count = 27;

        assert_eq!(caption(&window), "Showing 1 to 10 of 27 entries");
    }
}
