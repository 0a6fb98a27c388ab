use std::f64::consts::{PI, TAU};

/// Sliding windows of `N` consecutive items, yielding every full window.
pub struct ArrayWindows<I: Iterator, const N: usize> {
    iter: I,
    current: [I::Item; N],
    pending: bool,
}

impl<I: Iterator, const N: usize> Iterator for ArrayWindows<I, N>
where
    I::Item: Copy,
{
    type Item = [I::Item; N];

    fn next(&mut self) -> Option<[I::Item; N]> {
        if !self.pending {
            return None;
        }

        let window = self.current;
        match self.iter.next() {
            Some(item) => {
                self.current.rotate_left(1);
                self.current[N - 1] = item;
            }
            None => self.pending = false,
        }
        Some(window)
    }
}

/// Multiple of 2π to add to a raw phase step `delta`; zero unless `|delta| >= π`.
pub(crate) fn wrap_correction(delta: f64) -> f64 {
    if delta.abs() < PI {
        return 0.0;
    }
    let mut wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI && delta > 0.0 {
        wrapped = PI;
    }
    wrapped - delta
}

pub(crate) trait IterExt: Iterator + Sized {
    fn array_windows<const N: usize>(mut self) -> ArrayWindows<Self, N>
    where
        Self::Item: Copy + Default,
    {
        let mut pending = true;
        let current = std::array::from_fn(|_| {
            let val = self.next();
            if val.is_none() {
                pending = false;
            }
            val.unwrap_or_default()
        });
        ArrayWindows {
            iter: self,
            current,
            pending,
        }
    }
}

impl<I> IterExt for I where I: Iterator {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn yields_every_full_window() {
        let windows: Vec<[i32; 2]> = [1, 2, 3, 4].into_iter().array_windows().collect();
        assert_eq!(windows, vec![[1, 2], [2, 3], [3, 4]]);
    }

    #[test]
    fn short_input_has_no_windows() {
        let windows: Vec<[i32; 3]> = [1, 2].into_iter().array_windows().collect();
        assert!(windows.is_empty());

        let exact: Vec<[i32; 2]> = [7, 8].into_iter().array_windows().collect();
        assert_eq!(exact, vec![[7, 8]]);
    }

    #[test]
    fn half_turn_steps_keep_their_sign() {
        assert_eq!(wrap_correction(PI), 0.0);
        assert_eq!(wrap_correction(-PI), 0.0);
        assert_relative_eq!(wrap_correction(3.0 * PI), -TAU, epsilon = 1e-12);
    }
}
