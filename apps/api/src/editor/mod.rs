//! Block document model and the editing surface built on it.

pub mod blocks;
pub mod commands;
pub mod decorate;
pub mod document;
pub mod html;
pub mod markdown;
pub mod placeholders;
pub mod sanitize;
pub mod surface;

pub use document::{DocNode, Document};
pub use surface::{Caret, Editor, EditorEffect, EditorError, Selection};
