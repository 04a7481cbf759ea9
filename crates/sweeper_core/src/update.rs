use crate::{Admission, ChannelInfo, DiscoveryState, Effect, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: DiscoveryState, msg: Msg) -> (DiscoveryState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            if state.phase() == Phase::Paginating && !state.tally().started {
                state.tally_mut().started = true;
                vec![Effect::FetchNextPage]
            } else {
                Vec::new()
            }
        }
        Msg::PageFetched {
            candidates,
            next_cursor,
        } => {
            if state.phase() != Phase::Paginating {
                return (state, Vec::new());
            }
            state.set_phase(Phase::Dispatching);
            state.tally_mut().pages += 1;

            let mut effects = Vec::with_capacity(candidates.len() + 1);
            for candidate in candidates {
                let admission = state.criteria().admit(&candidate);
                let tally = state.tally_mut();
                tally.candidates_seen += 1;
                match admission {
                    Admission::Skip(_) => tally.skipped += 1,
                    Admission::Accept => {
                        tally.accepted += 1;
                        effects.push(Effect::Accept {
                            channel: ChannelInfo::from_candidate(&candidate, None),
                        });
                    }
                    Admission::Probe => {
                        tally.probes_launched += 1;
                        tally.in_flight += 1;
                        effects.push(Effect::LaunchProbe { candidate });
                    }
                }
            }

            if next_cursor.is_end() {
                state.tally_mut().listing_done = true;
                if state.in_flight() == 0 {
                    state.set_phase(Phase::Merging);
                    effects.push(Effect::Merge);
                } else {
                    state.set_phase(Phase::AwaitingProbes);
                }
            } else {
                state.set_phase(Phase::Paginating);
                effects.push(Effect::FetchNextPage);
            }
            effects
        }
        Msg::PageFailed { reason } => match state.phase() {
            Phase::Paginating | Phase::Dispatching => {
                state.abort(reason);
                vec![Effect::CancelPending]
            }
            _ => Vec::new(),
        },
        Msg::ProbeFinished { verdict, .. } => {
            state.record_verdict(&verdict);
            if state.phase() == Phase::AwaitingProbes && state.in_flight() == 0 {
                state.set_phase(Phase::Merging);
                vec![Effect::Merge]
            } else {
                Vec::new()
            }
        }
        Msg::Merged { total } => {
            if state.phase() == Phase::Merging {
                state.tally_mut().merged_total = Some(total);
                state.set_phase(Phase::Done);
            }
            Vec::new()
        }
    };

    (state, effects)
}
