use scholar_core::{update, AppState, Msg};

#[test]
fn reports_before_any_submission_leave_state_untouched() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::ChannelEnded { attempt: 3 });
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update(next, Msg::DownloadClicked);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn editing_the_form_has_no_effects_and_redraws_nothing() {
    let state = AppState::new();
    let (state, effects) = update(state, Msg::QueryChanged("rust".into()));
    let (mut state, more) = update(state, Msg::PagesChanged("2".into()));

    assert!(effects.is_empty() && more.is_empty());
    assert_eq!(state.form().query, "rust");
    assert_eq!(state.form().pages, "2");
    assert!(!state.consume_dirty());
}
