//! Default IEEE 488.2 common-command handlers.

use crate::exec::context::Context;
use crate::exec::dispatcher::Dispatcher;
use scpi_kit_errors::codes;

/// Identification string reported by the default `*IDN?` handler.
/// Instruments override this by re-registering `*IDN?`.
pub const DEFAULT_IDN: &str = "SCPI-Parser,VirtualInstrument,SN000000,0.1";

/// Enforce exactly one numeric parameter for `*ESE`/`*SRE`.
fn require_one_numeric_param(ctx: &mut Context) -> i32 {
    if ctx.params().is_empty() {
        ctx.push_standard_error(codes::MISSING_PARAMETER);
        return codes::MISSING_PARAMETER;
    }
    if ctx.params().len() > 1 {
        ctx.push_standard_error(codes::PARAMETER_NOT_ALLOWED);
        return codes::PARAMETER_NOT_ALLOWED;
    }
    if !ctx.params().at(0).is_numeric() {
        ctx.push_standard_error(codes::DATA_TYPE_ERROR);
        return codes::DATA_TYPE_ERROR;
    }
    0
}

/// Register the standard command set on `d`.
pub fn register_defaults(d: &mut Dispatcher) {
    d.register_common("*CLS", |ctx| {
        ctx.clear_status();
        0
    });

    d.register_common("*IDN?", |ctx| {
        ctx.result(DEFAULT_IDN);
        0
    });

    // Reset hook; instruments override with their own handler.
    d.register_common("*RST", |_ctx| 0);

    d.register_common("*OPC", |ctx| {
        ctx.status_mut().set_opc();
        0
    });

    d.register_common("*OPC?", |ctx| {
        ctx.result_int(1);
        0
    });

    d.register_common("*ESR?", |ctx| {
        let value = ctx.status_mut().read_and_clear_esr();
        ctx.result_int(i64::from(value));
        0
    });

    d.register_common("*ESE", |ctx| {
        let rc = require_one_numeric_param(ctx);
        if rc != 0 {
            return rc;
        }
        let mask = ctx.params().int(0, 0);
        ctx.status_mut().set_ese((mask & 0xFF) as u8);
        0
    });

    d.register_common("*ESE?", |ctx| {
        let value = ctx.status().ese();
        ctx.result_int(i64::from(value));
        0
    });

    d.register_common("*SRE", |ctx| {
        let rc = require_one_numeric_param(ctx);
        if rc != 0 {
            return rc;
        }
        let mask = ctx.params().int(0, 0);
        ctx.status_mut().set_sre((mask & 0xFF) as u8);
        0
    });

    d.register_common("*SRE?", |ctx| {
        let value = ctx.status().sre();
        ctx.result_int(i64::from(value));
        0
    });

    d.register_common("*STB?", |ctx| {
        let value = ctx.compute_stb();
        ctx.result_int(i64::from(value));
        0
    });
}
