//! Write protected registers

use crate::reg::{port, sysctl};
use rscanfd_core::RegisterAccess;

/// Register bus with a key protected block unlocked
///
/// Unlocking writes [`sysctl::KEY_UNLOCK`] to the key register. The block is
/// locked again with [`sysctl::KEY_LOCK`] when the guard is dropped, on every
/// path out of the scope, including early returns on errors.
///
/// Guards nest; an inner guard wrapping an outer one re-locks first.
pub(crate) struct KeyGuard<B: RegisterAccess> {
    bus: B,
    key_register: usize,
}

impl<B: RegisterAccess> KeyGuard<B> {
    pub(crate) fn unlock(mut bus: B, key_register: usize) -> Self {
        bus.write32(key_register, sysctl::KEY_UNLOCK);
        Self { bus, key_register }
    }
}

impl<B: RegisterAccess> RegisterAccess for KeyGuard<B> {
    fn read32(&self, address: usize) -> u32 {
        self.bus.read32(address)
    }

    fn write32(&mut self, address: usize, value: u32) {
        self.bus.write32(address, value)
    }

    fn read8(&self, address: usize) -> u8 {
        self.bus.read8(address)
    }

    fn write8(&mut self, address: usize, value: u8) {
        self.bus.write8(address, value)
    }
}

impl<B: RegisterAccess> Drop for KeyGuard<B> {
    fn drop(&mut self) {
        self.bus.write32(self.key_register, sysctl::KEY_LOCK);
    }
}

/// Writes `value` to `register` of port `group`, preceded by the complement
/// in the group's `PPCMD` register.
pub(crate) fn write_port<B: RegisterAccess>(bus: &mut B, group: usize, register: usize, value: u32) {
    bus.write32(port::ppcmd(group), !value);
    bus.write32(register, value);
}

/// Sets the bits of `mask` in `register` of port `group` to `set`, keeping
/// the other pins of the group untouched.
pub(crate) fn modify_port<B: RegisterAccess>(
    bus: &mut B,
    group: usize,
    register: usize,
    mask: u32,
    set: bool,
) {
    let current = bus.read32(register);
    let value = if set { current | mask } else { current & !mask };
    write_port(bus, group, register, value);
}
