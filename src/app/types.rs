// src/app/types.rs
use crate::app::program::{ProgramBundle, UpcomingCard};

/// Top-level tabs, mirroring the venue site's navigation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Programme,
    Pdf,
    Prochainement,
    Archives,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Programme, Tab::Pdf, Tab::Prochainement, Tab::Archives];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Programme => "Programme",
            Self::Pdf => "Programme PDF",
            Self::Prochainement => "Prochainement",
            Self::Archives => "Archives",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Programme => "programme",
            Self::Pdf => "pdf",
            Self::Prochainement => "prochainement",
            Self::Archives => "archives",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "programme" => Some(Self::Programme),
            "pdf" => Some(Self::Pdf),
            "prochainement" => Some(Self::Prochainement),
            "archives" => Some(Self::Archives),
            _ => None,
        }
    }
}

/// Memoized auxiliary-feed slot: untouched until the tab is first visited,
/// then either loaded or a sticky "indisponible" error.
#[derive(Debug, Default)]
pub enum AuxFeed<T> {
    #[default]
    NotRequested,
    Loading,
    Loaded(Vec<T>),
    Unavailable(String),
}

impl<T> AuxFeed<T> {
    pub fn apply(&mut self, result: Result<Vec<T>, String>) {
        *self = match result {
            Ok(list) => Self::Loaded(list),
            Err(e) => Self::Unavailable(e),
        };
    }
}

pub type BundleFeed = AuxFeed<ProgramBundle>;
pub type UpcomingFeed = AuxFeed<UpcomingCard>;
