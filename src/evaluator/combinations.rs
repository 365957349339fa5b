/// Iterator for C(5,3) = 10 combinations (choosing the three cards that make a bull).
pub struct Combinations5Choose3 {
    indices: [usize; 3],
    done: bool,
}

impl Combinations5Choose3 {
    pub fn new() -> Self {
        Self { indices: [0, 1, 2], done: false }
    }
}

impl Default for Combinations5Choose3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Combinations5Choose3 {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.indices;

        // Find rightmost index that can be incremented
        let mut i = 2;
        loop {
            if self.indices[i] < 5 - (3 - i) {
                self.indices[i] += 1;
                for j in (i + 1)..3 {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }

            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
        }

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (1, Some(10))
        }
    }
}

/// Bull number of a hand: the first triple (lexicographic) whose points sum
/// to a multiple of ten makes the bull, and the remaining two cards give
/// `(a + b) % 10`. `None` when no triple qualifies.
pub fn bull_number(points: &[u8; 5]) -> Option<u8> {
    let total: u32 = points.iter().map(|&p| u32::from(p)).sum();
    Combinations5Choose3::new().find_map(|[a, b, c]| {
        let triple = u32::from(points[a]) + u32::from(points[b]) + u32::from(points[c]);
        (triple % 10 == 0).then(|| ((total - triple) % 10) as u8)
    })
}
