use crate::sync::TimelineSync;

#[derive(Clone)]
pub struct AppState {
    pub sync: TimelineSync,
}

impl AppState {
    pub fn new(sync: TimelineSync) -> Self {
        Self { sync }
    }
}
