// src/services/icons.rs
use serde::{Deserialize, Serialize};

/// Every icon the site knows how to draw. Content refers to these by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Gavel,
    Family,
    Briefcase,
    Building,
    Home,
    Document,
    Compensation,
    Experience,
    Commitment,
    Results,
    Confidentiality,
    Whatsapp,
    Chatbot,
    MapPin,
}

impl Icon {
    pub fn asset_path(self) -> &'static str {
        match self {
            Icon::Gavel => "/icons/gavel.svg",
            Icon::Family => "/icons/family.svg",
            Icon::Briefcase => "/icons/briefcase.svg",
            Icon::Building => "/icons/building.svg",
            Icon::Home => "/icons/home.svg",
            Icon::Document => "/icons/document.svg",
            Icon::Compensation => "/icons/compensation.svg",
            Icon::Experience => "/icons/experience.svg",
            Icon::Commitment => "/icons/commitment.svg",
            Icon::Results => "/icons/results.svg",
            Icon::Confidentiality => "/icons/confidentiality.svg",
            Icon::Whatsapp => "/icons/whatsapp.svg",
            Icon::Chatbot => "/icons/chatbot.svg",
            Icon::MapPin => "/icons/map-pin.svg",
        }
    }
}

/// A practice area card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub icon: Icon,
    pub title: String,
    pub description: String,
}

/// A "why choose us" card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub icon: Icon,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Icon with its resolved asset, as sent to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct IconRef {
    pub name: Icon,
    pub src: &'static str,
}

impl From<Icon> for IconRef {
    fn from(icon: Icon) -> Self {
        Self {
            name: icon,
            src: icon.asset_path(),
        }
    }
}
