pub mod document;

