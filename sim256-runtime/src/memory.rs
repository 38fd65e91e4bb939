//! Memory-mapped I/O address decoding
//!
//! Load/store addresses come from a register. Below the architecture's I/O
//! threshold they are routed to devices instead of data memory:
//!
//! ```text
//! load:  [0, B)          -> button latch
//!        [B, threshold)  -> invalid input address
//! store: [0, M*M)        -> display cell (row = addr / M, col = addr % M)
//!        [M*M, threshold)-> unmapped, the store is dropped
//! both:  [threshold, 2^W)-> data memory
//! ```

use crate::error::{Result, RuntimeError};
use sim256_spec::Arch;

/// Direction of a memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Load,
    Store,
}

/// Where an access lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Button latch index
    Button(usize),
    /// Display grid cell
    Pixel { row: usize, col: usize },
    /// Data memory cell
    Data(usize),
    /// Output address with no device behind it
    Unmapped(u32),
}

impl Location {
    pub fn is_io(&self) -> bool {
        !matches!(self, Location::Data(_))
    }
}

/// Resolve an effective address for `access`
pub fn resolve(arch: &Arch, address: u32, access: Access) -> Result<Location> {
    if address < arch.io_threshold {
        let index = address as usize;
        return match access {
            Access::Load if index < arch.num_buttons => Ok(Location::Button(index)),
            Access::Load => Err(RuntimeError::InvalidInputAddress {
                address,
                buttons: arch.num_buttons,
            }),
            Access::Store if index < arch.matrix_cells() => Ok(Location::Pixel {
                row: index / arch.matrix_size,
                col: index % arch.matrix_size,
            }),
            Access::Store => Ok(Location::Unmapped(address)),
        };
    }

    let index = address as usize;
    if index >= arch.data_memory_len() {
        return Err(RuntimeError::OutOfBounds { address });
    }
    Ok(Location::Data(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_addresses() {
        let arch = Arch::S20;
        for addr in 0..4 {
            assert_eq!(
                resolve(&arch, addr, Access::Load).unwrap(),
                Location::Button(addr as usize)
            );
        }
        assert!(matches!(
            resolve(&arch, 4, Access::Load),
            Err(RuntimeError::InvalidInputAddress {
                address: 4,
                buttons: 4
            })
        ));
        assert!(resolve(&arch, 0x7F, Access::Load).is_err());
    }

    #[test]
    fn test_pixel_addresses() {
        let arch = Arch::APPLE_PI;
        assert_eq!(
            resolve(&arch, 12, Access::Store).unwrap(),
            Location::Pixel { row: 1, col: 2 }
        );
        assert_eq!(
            resolve(&arch, 99, Access::Store).unwrap(),
            Location::Pixel { row: 9, col: 9 }
        );
    }

    #[test]
    fn test_output_gap_is_unmapped() {
        let arch = Arch::APPLE_PI;
        assert_eq!(
            resolve(&arch, 100, Access::Store).unwrap(),
            Location::Unmapped(100)
        );
        assert_eq!(
            resolve(&arch, 0xFF, Access::Store).unwrap(),
            Location::Unmapped(0xFF)
        );
        // The same gap is still an error for loads
        assert!(resolve(&arch, 100, Access::Load).is_err());
    }

    #[test]
    fn test_data_addresses() {
        let arch = Arch::S20;
        assert_eq!(
            resolve(&arch, 0x80, Access::Load).unwrap(),
            Location::Data(0x80)
        );
        assert_eq!(
            resolve(&arch, 0xFF, Access::Store).unwrap(),
            Location::Data(0xFF)
        );
        assert!(matches!(
            resolve(&arch, 0x100, Access::Store),
            Err(RuntimeError::OutOfBounds { address: 0x100 })
        ));
    }

    #[test]
    fn test_location_is_io() {
        assert!(Location::Button(0).is_io());
        assert!(Location::Pixel { row: 0, col: 0 }.is_io());
        assert!(Location::Unmapped(100).is_io());
        assert!(!Location::Data(0x80).is_io());
    }
}
