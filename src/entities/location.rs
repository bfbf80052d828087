// 📍 Location Entity - Where sessions are played
//
// Sessions reference a location by name. A location can carry an image:
// either a bundled asset name or a path to a user-imported file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationImage {
    /// Asset shipped with the app
    Bundled(String),

    /// File imported by the user
    Imported(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub image: Option<LocationImage>,
}

impl Location {
    pub fn new(name: &str) -> Self {
        Location {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: LocationImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Case-insensitive name comparison
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Locations seeded into a fresh store
pub fn default_locations() -> Vec<Location> {
    [
        ("Bellagio", "bellagio"),
        ("Aria", "aria"),
        ("Wynn", "wynn"),
        ("Commerce Casino", "commerce"),
        ("Home Game", "home-game"),
        ("Online", "online"),
    ]
    .into_iter()
    .map(|(name, asset)| Location::new(name).with_image(LocationImage::Bundled(asset.to_string())))
    .collect()
}

/// Stakes seeded into a fresh store
pub fn default_stakes() -> Vec<String> {
    ["1/2", "1/3", "2/5", "5/10"]
        .into_iter()
        .map(String::from)
        .collect()
}
