use super::*;

impl AdmissionWorld {
    /// Append one transition record for `index`. Reason code and resulting stage
    /// are fixed per event type.
    pub(super) fn record_event(&mut self, tick: u64, event_type: EventType, index: TokenIndex) {
        let Some(token) = self.tokens.get(index) else {
            return;
        };
        self.event_log.push(Event {
            tick,
            event_type,
            reason_code: event_type.reason_code(),
            token_id: token.id.clone(),
            stage_id: event_type.resulting_stage(),
            class: token.class,
        });
    }

    pub fn events_for_token<'a>(&'a self, token_id: &'a str) -> impl Iterator<Item = &'a Event> {
        self.event_log
            .iter()
            .filter(move |event| event.token_id == token_id)
    }
}
