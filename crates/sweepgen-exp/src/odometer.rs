/// Mixed-radix counter over the arm counts of the free sweeps.
///
/// Walks the Cartesian product without materializing it; the last digit
/// varies fastest. With no digits the product holds exactly one empty tuple,
/// and any zero radix makes it empty.
#[derive(Debug, Clone)]
pub(crate) struct Odometer {
    radices: Vec<usize>,
    digits: Vec<usize>,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Exhausted,
}

impl Odometer {
    pub(crate) fn new(radices: Vec<usize>) -> Self {
        let digits = vec![0; radices.len()];
        Self {
            radices,
            digits,
            state: State::Fresh,
        }
    }

    /// Rewinds to the first tuple.
    pub(crate) fn reset(&mut self) {
        self.digits.iter_mut().for_each(|digit| *digit = 0);
        self.state = State::Fresh;
    }

    /// Number of tuples in the product, saturating at `usize::MAX`.
    pub(crate) fn len(&self) -> usize {
        self.radices
            .iter()
            .fold(1usize, |acc, &radix| acc.saturating_mul(radix))
    }

    /// Moves to the next tuple and returns its digits.
    pub(crate) fn advance(&mut self) -> Option<&[usize]> {
        match self.state {
            State::Exhausted => None,
            State::Fresh => {
                if self.radices.contains(&0) {
                    self.state = State::Exhausted;
                    return None;
                }
                self.state = State::Running;
                Some(&self.digits)
            }
            State::Running => {
                for idx in (0..self.digits.len()).rev() {
                    self.digits[idx] += 1;
                    if self.digits[idx] < self.radices[idx] {
                        return Some(&self.digits);
                    }
                    self.digits[idx] = 0;
                }
                self.state = State::Exhausted;
                None
            }
        }
    }
}
