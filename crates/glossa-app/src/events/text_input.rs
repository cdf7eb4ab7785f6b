use crate::state::AppState;

/// A keystroke in the input line; results arrive through the search forwarder
pub async fn handle_text_input(state: &AppState, text: String) {
    let query = state.session.lock().await.type_text(&text);

    if query.is_empty() {
        tracing::debug!("Input cleared (#{})", query.generation);
    } else {
        tracing::debug!("Searching '{}' (#{})", query.text, query.generation);
    }
}
