//! Feature path bookkeeping for TreeSHAP.
//!
//! [`PathState`] tracks the unique features on the root-to-node path
//! together with the fraction of "zero" (feature hidden, background flows
//! both ways) and "one" (feature observed, sample's way) subsets, plus the
//! permutation weight of each subset size. `extend`/`unwind` are the
//! EXTEND/UNWIND procedures of Lundberg et al. (2020), Algorithm 2;
//! `unwound_sum` fuses UNWIND with the weight summation needed at leaves.
//!
//! The element at index 0 is a placeholder (feature `-1`) for the empty
//! coalition, so real features live at indices `1..len()`.

/// One unique feature on the current path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathElement {
    /// Feature index, or -1 for the initial placeholder.
    pub feature: i32,
    /// Fraction of background paths that continue through this split when
    /// the feature is hidden (cover ratio of the followed child).
    pub zero_fraction: f64,
    /// 1.0 when the sample itself follows this branch, 0.0 on cold
    /// branches.
    pub one_fraction: f64,
    /// Permutation weight for subsets of this size.
    pub pweight: f64,
}

/// Growable path of unique features with Shapley permutation weights.
#[derive(Debug, Clone, Default)]
pub(crate) struct PathState {
    elements: Vec<PathElement>,
}

impl PathState {
    pub fn with_capacity(depth: usize) -> Self {
        Self {
            elements: Vec::with_capacity(depth + 1),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn element(&self, index: usize) -> &PathElement {
        &self.elements[index]
    }

    /// Index of `feature` on the path, if present.
    pub fn find(&self, feature: i32) -> Option<usize> {
        self.elements.iter().position(|e| e.feature == feature)
    }

    /// EXTEND: append a feature and redistribute permutation weights.
    pub fn extend(&mut self, zero_fraction: f64, one_fraction: f64, feature: i32) {
        let initial = if self.elements.is_empty() { 1.0 } else { 0.0 };
        self.elements.push(PathElement {
            feature,
            zero_fraction,
            one_fraction,
            pweight: initial,
        });

        let len = self.elements.len();
        for i in (0..len - 1).rev() {
            self.elements[i + 1].pweight +=
                one_fraction * self.elements[i].pweight * (i + 1) as f64 / len as f64;
            self.elements[i].pweight =
                zero_fraction * self.elements[i].pweight * (len - 1 - i) as f64 / len as f64;
        }
    }

    /// UNWIND: remove the feature at `index`, undoing its `extend`.
    pub fn unwind(&mut self, index: usize) {
        let len = self.elements.len();
        let one_fraction = self.elements[index].one_fraction;
        let zero_fraction = self.elements[index].zero_fraction;
        let mut next_one = self.elements[len - 1].pweight;

        for j in (0..len - 1).rev() {
            if one_fraction != 0.0 {
                let tmp = self.elements[j].pweight;
                self.elements[j].pweight = next_one * len as f64 / ((j + 1) as f64 * one_fraction);
                next_one = tmp
                    - self.elements[j].pweight * zero_fraction * (len - 1 - j) as f64 / len as f64;
            } else {
                self.elements[j].pweight = self.elements[j].pweight * len as f64
                    / (zero_fraction * (len - 1 - j) as f64);
            }
        }

        for j in index..len - 1 {
            self.elements[j].feature = self.elements[j + 1].feature;
            self.elements[j].zero_fraction = self.elements[j + 1].zero_fraction;
            self.elements[j].one_fraction = self.elements[j + 1].one_fraction;
        }
        self.elements.pop();
    }

    /// Total permutation weight the path would carry after unwinding the
    /// feature at `index`, without mutating the path.
    pub fn unwound_sum(&self, index: usize) -> f64 {
        let len = self.elements.len();
        let one_fraction = self.elements[index].one_fraction;
        let zero_fraction = self.elements[index].zero_fraction;
        let mut next_one = self.elements[len - 1].pweight;
        let mut total = 0.0;

        if one_fraction != 0.0 {
            for j in (0..len - 1).rev() {
                let tmp = next_one / ((j + 1) as f64 * one_fraction);
                total += tmp;
                next_one = self.elements[j].pweight - tmp * zero_fraction * (len - 1 - j) as f64;
            }
        } else {
            for j in (0..len - 1).rev() {
                total += self.elements[j].pweight / (zero_fraction * (len - 1 - j) as f64);
            }
        }

        total * len as f64
    }
}
