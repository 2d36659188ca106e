// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Short unique identifier generation.

use rand::Rng;

/// Alphabet without easily confused characters (no 0, 1, I, O, l).
const ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of generated identifiers.
pub const SHORT_ID_LEN: usize = 22;

/// Generates a short identifier from the given random number generator.
///
/// With 22 characters over a 56 character alphabet the collision probability
/// is comparable to a random UUID.
pub fn short_id<R: Rng>(rng: &mut R) -> String {
    (0..SHORT_ID_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_short_id_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let id = short_id(&mut rng);

        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_short_id_deterministic_per_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(short_id(&mut a), short_id(&mut b));

        let mut c = ChaCha8Rng::seed_from_u64(8);
        assert_ne!(short_id(&mut a), short_id(&mut c));
    }
}
