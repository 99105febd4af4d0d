//! Raw pointer input to semantic events.
//!
//! Each raw event is picked against the regions, diffed against the previous
//! frame's pick set and expanded into an ordered list of semantic events:
//!
//! 1. `exit` for every region picked last frame but not this one
//! 2. `enter` for every region picked this frame but not last
//! 3. the kind-specific event for every region picked this frame
//!    (`press`, `move_inside`, `rightClick`, or `release` / a single
//!    region-less `release_none` when nothing is picked)
//!
//! Within each group regions come topmost first.

use crate::domain::error::Result;
use crate::domain::{EventType, RawEvent, RawEventKind, Region};
use crate::fsm::RegionId;
use crate::interactor::{FsmSlot, Interactor};

/// One semantic event produced by a raw event, and whether it fired a
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub event: EventType,
    pub region: Option<RegionId>,
    pub fired: bool,
}

/// Regions under a local point, topmost first.
#[must_use]
pub fn pick_regions(regions: &[Region], local_x: f64, local_y: f64) -> Vec<RegionId> {
    regions
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, r)| r.pick(local_x - r.x(), local_y - r.y()))
        .map(|(index, _)| RegionId(index))
        .collect()
}

/// Expands a raw event kind into the ordered semantic events for one frame.
///
/// `previous` and `current` are pick sets, topmost first.
///
/// # Examples
///
/// ```
/// use hotspot::fsm::RegionId;
/// use hotspot::interactor::plan_events;
/// use hotspot::{EventType, RawEventKind};
///
/// let events = plan_events(&[RegionId(0)], &[RegionId(2), RegionId(1)], RawEventKind::Press);
/// assert_eq!(
///     events,
///     vec![
///         (EventType::Exit, Some(RegionId(0))),
///         (EventType::Enter, Some(RegionId(2))),
///         (EventType::Enter, Some(RegionId(1))),
///         (EventType::Press, Some(RegionId(2))),
///         (EventType::Press, Some(RegionId(1))),
///     ]
/// );
/// ```
#[must_use]
pub fn plan_events(
    previous: &[RegionId],
    current: &[RegionId],
    kind: RawEventKind,
) -> Vec<(EventType, Option<RegionId>)> {
    let mut exited: Vec<RegionId> = previous
        .iter()
        .copied()
        .filter(|id| !current.contains(id))
        .collect();
    exited.sort_unstable_by(|a, b| b.cmp(a));

    let mut entered: Vec<RegionId> = current
        .iter()
        .copied()
        .filter(|id| !previous.contains(id))
        .collect();
    entered.sort_unstable_by(|a, b| b.cmp(a));

    let mut events: Vec<(EventType, Option<RegionId>)> = exited
        .into_iter()
        .map(|id| (EventType::Exit, Some(id)))
        .chain(entered.into_iter().map(|id| (EventType::Enter, Some(id))))
        .collect();

    let per_region = match kind {
        RawEventKind::Press => EventType::Press,
        RawEventKind::Move => EventType::MoveInside,
        RawEventKind::RightClick => EventType::RightClick,
        RawEventKind::Release if current.is_empty() => {
            events.push((EventType::ReleaseNone, None));
            return events;
        }
        RawEventKind::Release => EventType::Release,
    };
    events.extend(current.iter().map(|id| (per_region, Some(*id))));
    events
}

impl Interactor {
    /// Regions under a point in interactor-local coordinates, topmost first.
    #[must_use]
    pub fn pick(&self, local_x: f64, local_y: f64) -> Vec<RegionId> {
        self.fsm()
            .map(|fsm| pick_regions(fsm.regions(), local_x, local_y))
            .unwrap_or_default()
    }

    /// Translates one raw pointer event into semantic events and feeds them to
    /// the state machine in order.
    ///
    /// `x` and `y` are host coordinates; the state machine and its actions see
    /// them relative to the interactor's position. Without an installed state
    /// machine this does nothing.
    ///
    /// # Errors
    ///
    /// A fatal action error stops the dispatch at the failing event. Events
    /// already dispatched keep their effects, and the previous frame's pick set
    /// is left as it was.
    pub fn dispatch_raw_event(&mut self, kind: RawEventKind, x: f64, y: f64) -> Result<Vec<DispatchedEvent>> {
        let FsmSlot::Ready(fsm) = &mut self.slot else {
            tracing::trace!(?kind, "no state machine installed, ignoring raw event");
            return Ok(Vec::new());
        };

        let local = RawEvent::new(kind, x - self.x, y - self.y);
        let _span = tracing::debug_span!("dispatch_raw_event", ?kind, x = local.x, y = local.y).entered();

        let current = pick_regions(fsm.regions(), local.x, local.y);
        let planned = plan_events(&self.bookkeeping, &current, kind);

        let mut dispatched = Vec::with_capacity(planned.len());
        for (event, region) in planned {
            let fired = fsm.act_on_event(event, region, Some(&local))?;
            dispatched.push(DispatchedEvent { event, region, fired });
        }

        tracing::debug!(
            picked = current.len(),
            events = dispatched.len(),
            fired = dispatched.iter().filter(|d| d.fired).count(),
            state = %fsm.current_state(),
            "raw event dispatched"
        );
        self.bookkeeping = current;
        Ok(dispatched)
    }

    /// Dispatches a [`RawEvent`] given in host coordinates.
    ///
    /// # Errors
    ///
    /// See [`Interactor::dispatch_raw_event`].
    pub fn dispatch(&mut self, raw: &RawEvent) -> Result<Vec<DispatchedEvent>> {
        self.dispatch_raw_event(raw.kind, raw.x, raw.y)
    }
}
