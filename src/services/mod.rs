// src/services/mod.rs
pub mod appointments;
pub mod article_editor;
pub mod article_store;
pub mod chatbot;
pub mod contact_relay;
pub mod gemini;
pub mod icons;
pub mod session_manager;
pub mod translator;
pub mod visitor_flags;
