//! Trail of visited positions.

use crate::Position;

/// Point capacity of the fixed store used without `std`.
pub const EMBEDDED_PATH_CAPACITY: usize = 256;

/// Smallest cap for which decimation still frees space.
pub const MIN_PATH_CAP: usize = 3;

#[cfg(feature = "std")]
type Store = std::vec::Vec<Position>;

#[cfg(not(feature = "std"))]
type Store = heapless::Vec<Position, EMBEDDED_PATH_CAPACITY>;

/// Append-only history of agent positions.
///
/// The first point is always the start position. Uncapped by default under
/// `std`; with a cap, a full store drops every other interior point before
/// accepting the next one, so the trail keeps its shape at half resolution.
#[derive(Debug, Clone)]
pub struct PathRecorder {
    points: Store,
    cap: Option<usize>,
    total: usize,
}

impl PathRecorder {
    pub fn new(start: Position) -> Self {
        #[cfg(feature = "std")]
        let cap = None;
        #[cfg(not(feature = "std"))]
        let cap = Some(EMBEDDED_PATH_CAPACITY);

        let mut recorder = Self {
            points: Store::new(),
            cap,
            total: 0,
        };
        recorder.push(start);
        recorder
    }

    pub fn with_cap(start: Position, cap: usize) -> Self {
        let cap = cap.max(MIN_PATH_CAP);
        #[cfg(not(feature = "std"))]
        let cap = cap.min(EMBEDDED_PATH_CAPACITY);

        let mut recorder = Self::new(start);
        recorder.cap = Some(cap);
        recorder
    }

    /// Appends one accepted step.
    pub fn record(&mut self, position: Position) {
        if let Some(cap) = self.cap {
            if self.points.len() >= cap {
                self.decimate();
            }
        }
        self.push(position);
    }

    fn push(&mut self, position: Position) {
        #[cfg(feature = "std")]
        self.points.push(position);
        #[cfg(not(feature = "std"))]
        let _ = self.points.push(position);

        self.total += 1;
    }

    fn decimate(&mut self) {
        let last = self.points.len() - 1;
        let mut index = 0;
        self.points.retain(|_| {
            let keep = index == 0 || index == last || index % 2 == 0;
            index += 1;
            keep
        });
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false, the start position is recorded on creation.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Position> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Position> {
        self.points.last()
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    /// Every point ever recorded, including the start and any decimated ones.
    pub fn total_recorded(&self) -> usize {
        self.total
    }
}
