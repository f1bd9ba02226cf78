use crate::session::ConnectionState;

#[test]
fn given_states_when_displayed_then_lowercase_names() {
    assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
    assert_eq!(ConnectionState::Open.to_string(), "open");
    assert_eq!(ConnectionState::Closing.to_string(), "closing");
}

#[test]
fn given_states_when_checked_then_only_open_is_open() {
    assert!(ConnectionState::Open.is_open());
    assert!(!ConnectionState::Connecting.is_open());
    assert!(!ConnectionState::default().is_open());
}
