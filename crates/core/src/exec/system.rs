//! Default `:SYSTem:ERRor` subtree handlers.

use crate::exec::dispatcher::Dispatcher;

/// Register `:SYSTem:ERRor[:NEXT]?`, `:SYSTem:ERRor:COUNt?`,
/// `:SYSTem:ERRor:CLEar`, and `:SYSTem:ERRor:ALL?` on `d`.
///
/// Responses use the SCPI error-report format `<code>,"<message>"` with
/// embedded quotes doubled.
pub fn register_defaults(d: &mut Dispatcher) {
    // [:NEXT] is optional, so a single registration answers both
    // :SYST:ERR? and :SYST:ERR:NEXT?.
    d.register_query(":SYSTem:ERRor[:NEXT]?", |ctx| {
        let entry = ctx.error_queue().pop();
        ctx.result(&entry.to_response_string());
        0
    })
    .expect("static pattern parses");

    d.register_query(":SYSTem:ERRor:COUNt?", |ctx| {
        let count = ctx.error_queue().len();
        ctx.result_int(count as i64);
        0
    })
    .expect("static pattern parses");

    d.register_set(":SYSTem:ERRor:CLEar", |ctx| {
        ctx.error_queue().clear();
        0
    })
    .expect("static pattern parses");

    d.register_query(":SYSTem:ERRor:ALL?", |ctx| {
        let all = ctx.error_queue().pop_all();
        if all.is_empty() {
            ctx.result("0,\"No error\"");
            return 0;
        }
        let joined = all
            .iter()
            .map(|e| e.to_response_string())
            .collect::<Vec<_>>()
            .join(",");
        ctx.result(&joined);
        0
    })
    .expect("static pattern parses");
}
