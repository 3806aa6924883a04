//! twok - a small threaded forum backend.
//!
//! Boards hold posts, posts hold replies, and a reply bumps the thread it
//! belongs to. Posting is gated per IP address by a minimum interval.

pub mod admission;
pub mod board;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use admission::{Admission, PostAdmissionGate};
pub use board::{Board, BoardService, Post, PostDraft};
pub use config::Config;
pub use db::Database;
pub use error::{Result, TwokError};
pub use web::WebServer;
