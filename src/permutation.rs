use std::ops::Deref;

/// A bijection on `0..n`, stored as its image: `self[i]` is where `i` goes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Option<Self> {
        let vec: Vec<usize> = values.into_iter().collect();

        let n = vec.len();
        let mut seen = vec![false; n];

        for &value in &vec {
            if value >= n || seen[value] {
                return None;
            }
            seen[value] = true;
        }

        Some(Self(vec))
    }

    pub fn inverse(&self) -> Self {
        let mut inverse = vec![0; self.0.len()];
        for (i, &j) in self.0.iter().enumerate() {
            inverse[j] = i;
        }
        Self(inverse)
    }

    /// Points mapped to themselves.
    pub fn fixed_points(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter(|(i, j)| i == *j).map(|(i, _)| i)
    }

    /// Disjoint cycles, each starting at its smallest element, ordered by that element.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.0.len()];
        let mut cycles = vec![];

        for start in 0..self.0.len() {
            if visited[start] {
                continue;
            }
            let mut cycle = vec![];
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                cycle.push(i);
                i = self.0[i];
            }
            cycles.push(cycle);
        }

        cycles
    }
}

impl Deref for Permutation {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_permutations() {
        assert!(Permutation::new([0, 1, 2]).is_some());
        assert!(Permutation::new([2, 0, 1]).is_some());
        assert!(Permutation::new([1, 0]).is_some());
        assert!(Permutation::new(vec![0]).is_some());
        assert!(Permutation::new(Vec::<usize>::new()).is_some());
    }

    #[test]
    fn test_invalid_permutations() {
        assert!(Permutation::new([0, 2]).is_none());
        assert!(Permutation::new([0, 1, 1]).is_none());
        assert!(Permutation::new([1, 2, 3]).is_none());
        assert!(Permutation::new([0, 0, 1]).is_none());
    }

    #[test]
    fn test_cycles() {
        let p = Permutation::new([2, 3, 4, 1, 0]).unwrap();
        assert_eq!(p.cycles(), vec![vec![0, 2, 4], vec![1, 3]]);
        assert_eq!(p.fixed_points().count(), 0);

        let p = Permutation::new([0, 2, 1, 3]).unwrap();
        assert_eq!(p.cycles(), vec![vec![0], vec![1, 2], vec![3]]);
        assert_eq!(p.fixed_points().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_inverse() {
        let p = Permutation::new([1, 2, 0]).unwrap();
        assert_eq!(&*p.inverse(), &[2, 0, 1]);
        assert_eq!(p.inverse().inverse(), p);
    }
}
