use scraper::{Html, Selector};

use crate::workflows::vacancy::domain::Status;

/// Maps rendered page content to a definite availability reading.
pub trait PageClassifier: Send + Sync {
    fn classify(&self, html: &str) -> Result<Status, ClassificationAmbiguous>;
}

/// The page carried neither a vacancy nor a no-vacancy marker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("page is ambiguous: {reason}")]
pub struct ClassificationAmbiguous {
    pub reason: &'static str,
}

impl ClassificationAmbiguous {
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Selector heuristics for UR rental listing pages.
///
/// The "no empty rooms" banner wins over everything else. Otherwise the room list must
/// contain at least one room row to count as available.
#[derive(Debug, Clone)]
pub struct UrListingClassifier {
    empty_room_banner: Selector,
    room_list: Selector,
    room_rows: Selector,
}

impl UrListingClassifier {
    pub fn new() -> Self {
        Self {
            empty_room_banner: selector("div.err-box.err-box--empty-room"),
            room_list: selector("div.article_property_list.js-no-room-hidden_result"),
            room_rows: selector("tbody.rep_room tr.js-log-item"),
        }
    }
}

impl Default for UrListingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

impl PageClassifier for UrListingClassifier {
    fn classify(&self, html: &str) -> Result<Status, ClassificationAmbiguous> {
        let document = Html::parse_document(html);

        if document.select(&self.empty_room_banner).next().is_some() {
            return Ok(Status::NotAvailable);
        }

        let Some(room_list) = document.select(&self.room_list).next() else {
            return Err(ClassificationAmbiguous::new("no room list or empty-room banner"));
        };

        if room_list.select(&self.room_rows).next().is_some() {
            Ok(Status::Available)
        } else {
            Err(ClassificationAmbiguous::new("room list present without room rows"))
        }
    }
}
