use serde::Serialize;

use crate::resources;

/// Entry of the home screen menu.
#[derive(Debug, Serialize)]
pub struct ResourceLink {
    pub key: &'static str,
    pub title: &'static str,
    pub can_create: bool,
}

/// Data required to render the main index template.
#[derive(Debug, Serialize)]
pub struct IndexPageData {
    pub resources: Vec<ResourceLink>,
}

impl IndexPageData {
    pub fn new() -> Self {
        Self {
            resources: resources::all()
                .iter()
                .map(|descriptor| ResourceLink {
                    key: descriptor.key,
                    title: descriptor.title,
                    can_create: descriptor.can_create(),
                })
                .collect(),
        }
    }
}

impl Default for IndexPageData {
    fn default() -> Self {
        Self::new()
    }
}
