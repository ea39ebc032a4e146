use scraper::Html;

/// Assert that a form fragment contains the error message `error_message`.
///
/// Form handlers return the form with inline error messages on validation
/// failure, rendered as red paragraphs under the offending input.
#[track_caller]
pub(crate) fn assert_fragment_contains_error(fragment_text: &str, error_message: &str) {
    let fragment = Html::parse_fragment(fragment_text);
    let error_selector = scraper::Selector::parse("p.text-red-500").unwrap();

    let error_messages = fragment
        .select(&error_selector)
        .map(|paragraph| paragraph.text().collect::<String>())
        .collect::<Vec<_>>();

    assert!(
        error_messages
            .iter()
            .any(|message| message.contains(error_message)),
        "want error message containing {error_message:?}, got {error_messages:?}"
    );
}
