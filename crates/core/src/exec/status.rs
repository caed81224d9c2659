//! IEEE 488.2 status registers.

use scpi_kit_errors as errors;

/// ESR bit 0: operation complete.
pub const ESR_OPC: u8 = 1 << 0;
/// ESR bit 2: query error.
pub const ESR_QYE: u8 = 1 << 2;
/// ESR bit 3: device-dependent error.
pub const ESR_DDE: u8 = 1 << 3;
/// ESR bit 4: execution error.
pub const ESR_EXE: u8 = 1 << 4;
/// ESR bit 5: command error.
pub const ESR_CME: u8 = 1 << 5;

/// STB bit 2: error/event queue not empty.
pub const STB_EAV: u8 = 1 << 2;
/// STB bit 4: message available.
pub const STB_MAV: u8 = 1 << 4;
/// STB bit 5: event-status summary.
pub const STB_ESB: u8 = 1 << 5;
/// STB bit 6: master summary status.
pub const STB_MSS: u8 = 1 << 6;

/// The standard event status register and its enable masks.
///
/// Holds ESR (events), ESE (event enable), and SRE (service-request
/// enable). The status byte itself is computed on demand from these plus
/// the queue states, see [`StatusRegister::compute_stb`].
#[derive(Debug, Clone, Default)]
pub struct StatusRegister {
    esr: u8,
    ese: u8,
    sre: u8,
}

impl StatusRegister {
    /// All registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current ESR value.
    pub fn esr(&self) -> u8 {
        self.esr
    }

    /// Read ESR and clear it, per `*ESR?` semantics.
    pub fn read_and_clear_esr(&mut self) -> u8 {
        std::mem::take(&mut self.esr)
    }

    /// Clear ESR.
    pub fn clear_esr(&mut self) {
        self.esr = 0;
    }

    /// Raise one ESR bit (0..=7; out-of-range bits are ignored).
    pub fn set_esr_bit(&mut self, bit: u8) {
        if bit <= 7 {
            self.esr |= 1 << bit;
        }
    }

    /// Raise the operation-complete bit, per `*OPC`.
    pub fn set_opc(&mut self) {
        self.esr |= ESR_OPC;
    }

    /// Raise the ESR bit matching a SCPI error code's range: CME for
    /// command errors, EXE for execution, DDE for device-specific, QYE for
    /// query errors.
    pub fn record_error(&mut self, code: i32) {
        if errors::is_command_error(code) {
            self.esr |= ESR_CME;
        } else if errors::is_execution_error(code) {
            self.esr |= ESR_EXE;
        } else if errors::is_device_error(code) {
            self.esr |= ESR_DDE;
        } else if errors::is_query_error(code) {
            self.esr |= ESR_QYE;
        }
    }

    /// Event status enable mask.
    pub fn ese(&self) -> u8 {
        self.ese
    }

    /// Set the event status enable mask.
    pub fn set_ese(&mut self, mask: u8) {
        self.ese = mask;
    }

    /// Service request enable mask.
    pub fn sre(&self) -> u8 {
        self.sre
    }

    /// Set the service request enable mask.
    pub fn set_sre(&mut self, mask: u8) {
        self.sre = mask;
    }

    /// Compute the status byte from queue states.
    ///
    /// EAV, MAV, and ESB are assembled first; MSS is then derived from the
    /// scratch value against SRE and does not feed back into itself.
    pub fn compute_stb(&self, error_queue_not_empty: bool, message_available: bool) -> u8 {
        let mut stb = 0u8;
        if error_queue_not_empty {
            stb |= STB_EAV;
        }
        if message_available {
            stb |= STB_MAV;
        }
        if self.esr & self.ese != 0 {
            stb |= STB_ESB;
        }
        if stb & self.sre != 0 {
            stb |= STB_MSS;
        }
        stb
    }

    /// `*CLS` semantics for this register set: ESR is cleared, the enable
    /// masks survive.
    pub fn clear_for_cls(&mut self) {
        self.esr = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scpi_kit_errors::codes;

    #[test]
    fn error_ranges_map_to_bits() {
        let mut sr = StatusRegister::new();
        sr.record_error(codes::SYNTAX_ERROR);
        assert_eq!(sr.esr(), ESR_CME);
        sr.record_error(codes::DATA_OUT_OF_RANGE);
        assert_eq!(sr.esr(), ESR_CME | ESR_EXE);
        sr.record_error(codes::QUEUE_OVERFLOW);
        assert_eq!(sr.esr(), ESR_CME | ESR_EXE | ESR_DDE);
        sr.record_error(codes::QUERY_INTERRUPTED);
        assert_eq!(sr.esr(), ESR_CME | ESR_EXE | ESR_DDE | ESR_QYE);
        // Positive codes raise nothing.
        sr.clear_esr();
        sr.record_error(17);
        assert_eq!(sr.esr(), 0);
    }

    #[test]
    fn read_and_clear() {
        let mut sr = StatusRegister::new();
        sr.set_opc();
        assert_eq!(sr.read_and_clear_esr(), ESR_OPC);
        assert_eq!(sr.esr(), 0);
    }

    #[test]
    fn stb_eav_and_mav() {
        let sr = StatusRegister::new();
        assert_eq!(sr.compute_stb(false, false), 0);
        assert_eq!(sr.compute_stb(true, false), STB_EAV);
        assert_eq!(sr.compute_stb(false, true), STB_MAV);
    }

    #[test]
    fn stb_esb_requires_enable_mask() {
        let mut sr = StatusRegister::new();
        sr.record_error(codes::SYNTAX_ERROR);
        // ESE zero: no summary bit.
        assert_eq!(sr.compute_stb(false, false), 0);
        sr.set_ese(ESR_CME);
        assert_eq!(sr.compute_stb(false, false), STB_ESB);
    }

    #[test]
    fn stb_mss_from_scratch_value() {
        let mut sr = StatusRegister::new();
        sr.set_sre(STB_EAV);
        let stb = sr.compute_stb(true, false);
        assert_eq!(stb, STB_EAV | STB_MSS);
        // MSS itself enabled in SRE does not self-trigger.
        let mut sr = StatusRegister::new();
        sr.set_sre(STB_MSS);
        assert_eq!(sr.compute_stb(false, false), 0);
    }

    #[test]
    fn cls_preserves_enables() {
        let mut sr = StatusRegister::new();
        sr.set_ese(0xFF);
        sr.set_sre(0xFF);
        sr.record_error(codes::SYNTAX_ERROR);
        sr.clear_for_cls();
        assert_eq!(sr.esr(), 0);
        assert_eq!(sr.ese(), 0xFF);
        assert_eq!(sr.sre(), 0xFF);
    }

    #[test]
    fn esr_bit_range_guard() {
        let mut sr = StatusRegister::new();
        sr.set_esr_bit(9);
        assert_eq!(sr.esr(), 0);
        sr.set_esr_bit(7);
        assert_eq!(sr.esr(), 0x80);
    }
}
