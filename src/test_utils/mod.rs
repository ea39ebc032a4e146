#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;

pub(crate) use form::assert_fragment_contains_error;
pub(crate) use html::{assert_valid_html, parse_html_document};
