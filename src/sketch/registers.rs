/// A fixed-size array of max-registers, one slot of the decaying ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSketch {
    registers: Box<[u8]>,
}

impl RegisterSketch {
    pub fn new(register_count: usize) -> Self {
        Self {
            registers: vec![0u8; register_count].into_boxed_slice(),
        }
    }

    /// `register[index] = max(register[index], rank)`.
    ///
    /// Returns whether the register grew. Callers derive `index` by masking,
    /// so it is always in range.
    #[inline]
    pub fn update(&mut self, index: usize, rank: u8) -> bool {
        let slot = &mut self.registers[index];
        if rank > *slot {
            *slot = rank;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.registers.fill(0);
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.registers.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// True when no register has been raised since the last clear.
    pub fn is_zeroed(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.registers
    }

    /// Defensive copy of the registers.
    pub fn to_vec(&self) -> Vec<u8> {
        self.registers.to_vec()
    }
}
