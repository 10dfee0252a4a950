use chrono::NaiveDate;
use provider::{Location, MonthSlice};
use rustc_hash::FxHashMap;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

/// Oldest navigable month, relative to the current one.
pub const MIN_OFFSET: i32 = -11;
pub const MAX_OFFSET: i32 = 0;

const DEFAULT_LABEL: &str = "Temperature trend";
const MONTH_LABEL_FORMAT: &str = "%B %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

impl Direction {
    fn step(self) -> i32 {
        match self {
            Direction::Back => -1,
            Direction::Forward => 1,
        }
    }
}

/// An immutable description of one month-slice fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRequest {
    pub id: Uuid,
    pub location: Location,
    pub offset: i32,
    /// Offset to fall back to if the fetch fails.
    pub from_offset: i32,
}

impl SliceRequest {
    fn new(location: Location, offset: i32, from_offset: i32) -> Self {
        SliceRequest {
            id: Uuid::new_v4(),
            location,
            offset,
            from_offset,
        }
    }
}

/// Identifies the full load issued for a location, so a superseded one can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub struct FullLoadRequest {
    pub id: Uuid,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Draw this slice right away, without animation.
    Show(Arc<MonthSlice>),
    /// Fetch the slice, then report back through [`Navigator::on_slice_fetched`].
    Fetch(SliceRequest),
}

pub fn in_range(offset: i32) -> bool {
    (MIN_OFFSET..=MAX_OFFSET).contains(&offset)
}

/// First day of the month `offset` months away from `today`.
pub fn month_for_offset(today: NaiveDate, offset: i32) -> Option<NaiveDate> {
    provider::month_start(today, offset)
}

/// Month window, per-location slice cache and prefetch bookkeeping for the chart.
///
/// Performs no IO; callers execute the returned requests and feed the
/// results back in.
#[derive(Debug, Default)]
pub struct Navigator {
    location: Option<Location>,
    offset: i32,
    default_slice: Option<Arc<MonthSlice>>,
    full_load: Option<FullLoadRequest>,
    cache: FxHashMap<i32, Arc<MonthSlice>>,
    pending: Option<SliceRequest>,
    prefetching: FxHashMap<i32, Uuid>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything about the previous place and opens a new full load for it.
    ///
    /// Navigation stays disabled until that load installs the default slice.
    pub fn reset_for_location(&mut self, location: Location) -> FullLoadRequest {
        let request = FullLoadRequest {
            id: Uuid::new_v4(),
            location,
        };

        self.location = Some(location);
        self.offset = 0;
        self.default_slice = None;
        self.full_load = Some(request.clone());
        self.cache.clear();
        self.pending = None;
        self.prefetching.clear();

        request
    }

    /// The full load still in flight, if any.
    pub fn full_load(&self) -> Option<&FullLoadRequest> {
        self.full_load.as_ref()
    }

    /// Settles a full load. Returns the slice to draw, `None` when the request was
    /// superseded or failed.
    pub fn on_full_load<E: Display>(
        &mut self,
        request: &FullLoadRequest,
        result: Result<MonthSlice, E>,
    ) -> Option<Arc<MonthSlice>> {
        if self.full_load.as_ref().map(|r| r.id) != Some(request.id) {
            log::debug!("Ignoring superseded full load for {}", request.location);
            return None;
        }
        self.full_load = None;

        match result {
            Ok(slice) => {
                let slice = Arc::new(slice);
                self.default_slice = Some(Arc::clone(&slice));
                Some(slice)
            }
            Err(err) => {
                log::warn!("Full load for {} failed: {err}", request.location);
                None
            }
        }
    }

    /// Whether `request` is the full load currently awaited.
    pub fn is_current_full_load(&self, request: &FullLoadRequest) -> bool {
        self.full_load.as_ref().is_some_and(|r| r.id == request.id)
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_go_forward(&self) -> bool {
        self.default_slice.is_some() && self.offset < MAX_OFFSET
    }

    pub fn can_go_back(&self) -> bool {
        self.default_slice.is_some() && self.offset > MIN_OFFSET
    }

    pub fn label(&self, today: NaiveDate) -> String {
        if self.offset == 0 {
            return DEFAULT_LABEL.to_string();
        }

        month_for_offset(today, self.offset).map_or_else(
            || DEFAULT_LABEL.to_string(),
            |first| first.format(MONTH_LABEL_FORMAT).to_string(),
        )
    }

    pub fn current_slice(&self) -> Option<Arc<MonthSlice>> {
        if self.offset == 0 {
            self.default_slice.clone()
        } else {
            self.cache.get(&self.offset).cloned()
        }
    }

    #[cfg(test)]
    pub(crate) fn cached(&self, offset: i32) -> Option<&Arc<MonthSlice>> {
        self.cache.get(&offset)
    }

    /// Moves one month. `None` when the move is out of range, the current month
    /// is not loaded yet, or a fetch is still pending.
    pub fn navigate(&mut self, direction: Direction) -> Option<Action> {
        let location = self.location?;

        if self.default_slice.is_none() {
            log::debug!("Navigation dropped, current month for {location} not loaded");
            return None;
        }

        if let Some(pending) = &self.pending {
            log::debug!(
                "Navigation dropped, month {} still loading",
                pending.offset
            );
            return None;
        }

        let target = self.offset + direction.step();
        if !in_range(target) {
            return None;
        }

        if target == 0 {
            let slice = self.default_slice.clone()?;
            self.offset = target;
            return Some(Action::Show(slice));
        }

        if let Some(slice) = self.cache.get(&target) {
            self.offset = target;
            return Some(Action::Show(Arc::clone(slice)));
        }

        let request = SliceRequest::new(location, target, self.offset);
        self.offset = target;
        self.pending = Some(request.clone());

        Some(Action::Fetch(request))
    }

    /// Settles a navigation fetch. Returns the slice to draw, if any.
    ///
    /// On failure the offset snaps back to where the navigation started.
    pub fn on_slice_fetched<E: Display>(
        &mut self,
        request: &SliceRequest,
        result: Result<MonthSlice, E>,
    ) -> Option<Arc<MonthSlice>> {
        if self.pending.as_ref().map(|p| p.id) != Some(request.id) {
            log::debug!("Ignoring stale month {} response", request.offset);
            return None;
        }
        self.pending = None;

        match result {
            Ok(slice) => {
                let slice = Arc::new(slice);
                self.cache.insert(request.offset, Arc::clone(&slice));
                Some(slice)
            }
            Err(err) => {
                log::warn!(
                    "Failed to load month {} for {}: {err}",
                    request.offset,
                    request.location
                );
                self.offset = request.from_offset;
                None
            }
        }
    }

    /// Requests for the neighbouring months that are neither cached nor in flight.
    ///
    /// Offset 0 is only ever filled by a full load, so it is never a target.
    pub fn prefetch_adjacent(&mut self) -> Vec<SliceRequest> {
        let Some(location) = self.location else {
            return vec![];
        };

        let mut requests = vec![];

        for target in [self.offset - 1, self.offset + 1] {
            if target == 0
                || !in_range(target)
                || self.cache.contains_key(&target)
                || self.prefetching.contains_key(&target)
                || self.pending.as_ref().is_some_and(|p| p.offset == target)
            {
                continue;
            }

            let request = SliceRequest::new(location, target, self.offset);
            self.prefetching.insert(target, request.id);
            requests.push(request);
        }

        requests
    }

    /// Settles a prefetch. Failures are dropped; the month is simply fetched again later.
    pub fn on_prefetched<E: Display>(&mut self, request: &SliceRequest, result: Result<MonthSlice, E>) {
        if self.prefetching.get(&request.offset) == Some(&request.id) {
            self.prefetching.remove(&request.offset);
        }

        match result {
            Ok(slice) => {
                self.store_prefetched(request, slice);
            }
            Err(err) => {
                log::debug!("Prefetch of month {} failed: {err}", request.offset);
            }
        }
    }

    /// Caches a prefetched slice if it still belongs to the active location.
    pub fn store_prefetched(&mut self, request: &SliceRequest, slice: MonthSlice) -> bool {
        let current = self
            .location
            .is_some_and(|location| location.same_place(&request.location));

        if !current || request.offset == 0 || !in_range(request.offset) {
            return false;
        }

        self.cache
            .entry(request.offset)
            .or_insert_with(|| Arc::new(slice));
        true
    }

    /// Offsets with a prefetch in flight.
    #[cfg(test)]
    pub(crate) fn prefetching(&self) -> rustc_hash::FxHashSet<i32> {
        self.prefetching.keys().copied().collect()
    }
}
