mod test_demo_call_flow;
mod test_dropping_client_releases_media;
mod test_leave_cancels_pending_step;
mod test_mute_reaches_capture;
mod test_open_failure_releases_media;
mod test_relay_lost;
mod test_room_full;
mod test_stale_session_events_ignored;
