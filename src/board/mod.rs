//! Signal-light status board: the newest state of every machine per
//! location, kept warm by a background poller.

mod cache;
mod controller;
mod poller;
mod types;

pub use cache::BoardCache;
pub use controller::BoardController;
pub use poller::{board_poller, load_board, BoardSource};
pub use types::{BoardEntry, BoardSnapshot};

/// Poller targets: each configured location, or every machine when none are set.
pub fn board_locations(configured: &[String]) -> Vec<Option<String>> {
    if configured.is_empty() {
        vec![None]
    } else {
        configured.iter().cloned().map(Some).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_location_list_means_whole_plant() {
        assert_eq!(board_locations(&[]), vec![None]);
        assert_eq!(
            board_locations(&["plant-1".to_string()]),
            vec![Some("plant-1".to_string())]
        );
    }
}
