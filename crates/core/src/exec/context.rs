//! Per-message execution context.
//!
//! A [`Context`] carries everything a handler needs: the parsed parameters
//! and node-suffix values, the response channel, the error queue, and the
//! IEEE 488.2 status registers. Response routing prefers a binary output
//! callback, then a text output callback, and falls back to an internal
//! buffer that the host drains with [`Context::pop_text_response`] /
//! [`Context::pop_binary_response`].

use crate::exec::status::StatusRegister;
use crate::params::{BlockScalar, ParameterList, format_significant};
use crate::tree::node_params::NodeParamValues;
use scpi_kit_errors::{ErrorQueue, codes, message};
use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

/// Byte order used when serializing block arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Network byte order, the SCPI convention.
    #[default]
    BigEndian,
    /// Host order on x86-class machines.
    LittleEndian,
}

/// Text response sink.
pub type TextOutput = Box<dyn FnMut(&str) + Send>;
/// Binary response sink. Block responses arrive as header then payload
/// (and terminator for indefinite blocks).
pub type BinaryOutput = Box<dyn FnMut(&[u8]) + Send>;

enum ResponseBody {
    Text(String),
    Binary(Vec<u8>),
}

/// One buffered response awaiting retrieval.
struct ResponseItem {
    body: ResponseBody,
    indefinite: bool,
}

/// Execution state for one program message.
pub struct Context {
    params: ParameterList,
    node_params: NodeParamValues,
    is_query: bool,

    text_output: Option<TextOutput>,
    binary_output: Option<BinaryOutput>,
    responses: VecDeque<ResponseItem>,
    last_response_indefinite: bool,

    error_queue: Arc<ErrorQueue>,
    status: StatusRegister,
    transient_code: i32,
    transient_message: String,

    byte_order: ByteOrder,
    user_data: Option<Box<dyn Any + Send>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Context with the default error-queue capacity.
    pub fn new() -> Self {
        Self::with_error_capacity(scpi_kit_errors::DEFAULT_ERROR_QUEUE_CAPACITY)
    }

    /// Context with an explicit error-queue capacity (minimum 1).
    pub fn with_error_capacity(capacity: usize) -> Self {
        Self {
            params: ParameterList::new(),
            node_params: NodeParamValues::new(),
            is_query: false,
            text_output: None,
            binary_output: None,
            responses: VecDeque::new(),
            last_response_indefinite: false,
            error_queue: Arc::new(ErrorQueue::new(capacity)),
            status: StatusRegister::new(),
            transient_code: 0,
            transient_message: String::new(),
            byte_order: ByteOrder::default(),
            user_data: None,
        }
    }

    // ── Parameter access ────────────────────────────────────────────────

    /// Parameters of the command currently executing.
    pub fn params(&self) -> &ParameterList {
        &self.params
    }

    /// Node-suffix values of the command currently executing.
    pub fn node_params(&self) -> &NodeParamValues {
        &self.node_params
    }

    /// Suffix value by registration parameter name.
    pub fn node_param(&self, name: &str, default: i32) -> i32 {
        self.node_params.get(name, default)
    }

    /// Suffix value by extraction order.
    pub fn node_param_at(&self, index: usize, default: i32) -> i32 {
        self.node_params.get_index(index, default)
    }

    /// Suffix value by node short or long name.
    pub fn node_param_of(&self, node_name: &str, default: i32) -> i32 {
        self.node_params.get_by_node_name(node_name, default)
    }

    /// Install the command state before invoking a handler.
    pub(crate) fn bind_command(
        &mut self,
        params: ParameterList,
        node_params: NodeParamValues,
        is_query: bool,
    ) {
        self.params = params;
        self.node_params = node_params;
        self.is_query = is_query;
    }

    /// `true` while a query handler is running.
    pub fn is_query(&self) -> bool {
        self.is_query
    }

    /// Override the query flag (normally set by the dispatcher).
    pub fn set_query(&mut self, is_query: bool) {
        self.is_query = is_query;
    }

    // ── Output configuration ────────────────────────────────────────────

    /// Install a text output callback. Disables response buffering.
    pub fn set_text_output(&mut self, cb: TextOutput) {
        self.text_output = Some(cb);
    }

    /// Install a binary output callback. Takes precedence over the text
    /// callback for block responses. Disables response buffering.
    pub fn set_binary_output(&mut self, cb: BinaryOutput) {
        self.binary_output = Some(cb);
    }

    /// Byte order for block-array serialization.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Set the byte order for block-array serialization.
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.byte_order = order;
    }

    fn buffered_mode(&self) -> bool {
        self.text_output.is_none() && self.binary_output.is_none()
    }

    // ── Text responses ──────────────────────────────────────────────────

    fn emit_text(&mut self, s: String) {
        if let Some(cb) = self.text_output.as_mut() {
            cb(&s);
            return;
        }
        if self.binary_output.is_some() {
            // Only a binary sink is configured; plain text has nowhere to
            // go and is dropped.
            return;
        }
        self.responses.push_back(ResponseItem {
            body: ResponseBody::Text(s),
            indefinite: false,
        });
        self.last_response_indefinite = false;
    }

    /// Emit a text response.
    pub fn result(&mut self, s: &str) {
        self.emit_text(s.to_string());
    }

    /// Emit an integer response.
    pub fn result_int(&mut self, v: i64) {
        self.emit_text(v.to_string());
    }

    /// Emit a float response with the default 12 significant digits.
    pub fn result_f64(&mut self, v: f64) {
        self.result_f64_prec(v, 12);
    }

    /// Emit a float response with an explicit significant-digit count.
    pub fn result_f64_prec(&mut self, v: f64, precision: usize) {
        self.emit_text(format_significant(v, precision));
    }

    /// Emit a boolean response as `1` / `0`.
    pub fn result_bool(&mut self, v: bool) {
        self.emit_text(if v { "1" } else { "0" }.to_string());
    }

    // ── Block responses ─────────────────────────────────────────────────

    /// Emit a definite-length block response (`#<n><len><bytes>`).
    pub fn result_block(&mut self, data: &[u8]) {
        let header = block_header(data.len());

        if let Some(cb) = self.binary_output.as_mut() {
            cb(header.as_bytes());
            if !data.is_empty() {
                cb(data);
            }
            return;
        }

        if let Some(cb) = self.text_output.as_mut() {
            let mut out = String::with_capacity(header.len() + data.len());
            out.push_str(&header);
            // Payload bytes are passed through; non-UTF-8 payloads are
            // replaced lossily on this text-only path.
            out.push_str(&String::from_utf8_lossy(data));
            cb(&out);
            return;
        }

        let mut bytes = Vec::with_capacity(header.len() + data.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(data);
        self.responses.push_back(ResponseItem {
            body: ResponseBody::Binary(bytes),
            indefinite: false,
        });
        self.last_response_indefinite = false;
    }

    /// Emit an indefinite-length block response (`#0<bytes>\n`).
    pub fn result_indefinite_block(&mut self, data: &[u8]) {
        if let Some(cb) = self.binary_output.as_mut() {
            cb(b"#0");
            if !data.is_empty() {
                cb(data);
            }
            cb(b"\n");
            return;
        }

        if let Some(cb) = self.text_output.as_mut() {
            let mut out = String::with_capacity(data.len() + 3);
            out.push_str("#0");
            out.push_str(&String::from_utf8_lossy(data));
            out.push('\n');
            cb(&out);
            return;
        }

        let mut bytes = Vec::with_capacity(data.len() + 3);
        bytes.extend_from_slice(b"#0");
        bytes.extend_from_slice(data);
        bytes.push(b'\n');
        self.responses.push_back(ResponseItem {
            body: ResponseBody::Binary(bytes),
            indefinite: true,
        });
        self.last_response_indefinite = true;
    }

    /// Serialize a scalar array in the configured byte order and emit it
    /// as a definite-length block.
    pub fn result_block_array<T: BlockScalar>(&mut self, data: &[T]) {
        let mut bytes = Vec::with_capacity(data.len() * T::WIDTH);
        for &v in data {
            match self.byte_order {
                ByteOrder::BigEndian => v.write_be(&mut bytes),
                ByteOrder::LittleEndian => v.write_le(&mut bytes),
            }
        }
        self.result_block(&bytes);
    }

    // ── Buffered-response retrieval ─────────────────────────────────────

    /// `true` when a buffered response is waiting to be read.
    pub fn has_pending_response(&self) -> bool {
        !self.responses.is_empty()
    }

    /// `true` when the most recently queued response was an indefinite
    /// block (drives the -440 query-sequence error).
    pub fn last_response_was_indefinite(&self) -> bool {
        self.last_response_indefinite
    }

    /// Pop the oldest buffered response as text. Binary responses are
    /// converted lossily. An empty buffer queues `-420 Query UNTERMINATED`
    /// and returns an empty string.
    pub fn pop_text_response(&mut self) -> String {
        let Some(item) = self.responses.pop_front() else {
            self.push_standard_error(codes::QUERY_UNTERMINATED);
            return String::new();
        };
        if self.responses.is_empty() {
            self.last_response_indefinite = false;
        }
        match item.body {
            ResponseBody::Text(s) => s,
            ResponseBody::Binary(b) => String::from_utf8_lossy(&b).into_owned(),
        }
    }

    /// Pop the oldest buffered response as bytes. An empty buffer queues
    /// `-420 Query UNTERMINATED` and returns an empty vector.
    pub fn pop_binary_response(&mut self) -> Vec<u8> {
        let Some(item) = self.responses.pop_front() else {
            self.push_standard_error(codes::QUERY_UNTERMINATED);
            return Vec::new();
        };
        if self.responses.is_empty() {
            self.last_response_indefinite = false;
        }
        match item.body {
            ResponseBody::Text(s) => s.into_bytes(),
            ResponseBody::Binary(b) => b,
        }
    }

    /// Discard all buffered responses.
    pub fn clear_responses(&mut self) {
        self.responses.clear();
        self.last_response_indefinite = false;
    }

    // ── Errors ──────────────────────────────────────────────────────────

    /// Shared handle to the error queue. Clone the `Arc` to push errors
    /// from a background thread.
    pub fn error_queue(&self) -> &Arc<ErrorQueue> {
        &self.error_queue
    }

    /// Queue an error, record it as the transient error of the current
    /// command, and raise the matching ESR bit.
    pub fn push_error(&mut self, code: i32, msg: &str) {
        self.push_error_with_context(code, msg, "");
    }

    /// [`Context::push_error`] with a context string on the queue entry.
    pub fn push_error_with_context(&mut self, code: i32, msg: &str, context: &str) {
        self.transient_code = code;
        self.transient_message = msg.to_string();
        self.status.record_error(code);
        self.error_queue.push_with_context(code, msg, context);
    }

    /// Queue a standard error using the default message for `code`.
    pub fn push_standard_error(&mut self, code: i32) {
        self.push_error(code, message(code));
    }

    /// Queue a standard error with extra detail appended as
    /// `"<standard>; <info>"`.
    pub fn push_standard_error_with_info(&mut self, code: i32, info: &str) {
        let mut msg = message(code).to_string();
        if !info.is_empty() {
            msg.push_str("; ");
            msg.push_str(info);
        }
        self.push_error(code, &msg);
    }

    /// `true` when the current command has recorded an error.
    pub fn has_transient_error(&self) -> bool {
        self.transient_code != 0
    }

    /// Error code recorded by the current command, `0` when clean.
    pub fn transient_error_code(&self) -> i32 {
        self.transient_code
    }

    /// Message recorded by the current command.
    pub fn transient_error_message(&self) -> &str {
        &self.transient_message
    }

    /// Clear the transient error without touching the queue.
    pub fn clear_transient_error(&mut self) {
        self.transient_code = 0;
        self.transient_message.clear();
    }

    // ── Status ──────────────────────────────────────────────────────────

    /// The status registers.
    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    /// Mutable access to the status registers.
    pub fn status_mut(&mut self) -> &mut StatusRegister {
        &mut self.status
    }

    /// Compute the status byte. MAV reflects the response buffer only in
    /// buffered mode; with an output callback installed the host already
    /// has the data.
    pub fn compute_stb(&self) -> u8 {
        let mav = self.buffered_mode() && !self.responses.is_empty();
        self.status.compute_stb(!self.error_queue.is_empty(), mav)
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Clear per-command state (parameters, node params, query flag,
    /// transient error). The error queue, responses, and status survive.
    pub fn reset_command_state(&mut self) {
        self.params.clear();
        self.node_params.clear();
        self.is_query = false;
        self.clear_transient_error();
    }

    /// `*CLS`: clear ESR, drain the error queue, drop buffered responses,
    /// and clear the transient error. ESE/SRE are preserved.
    pub fn clear_status(&mut self) {
        self.error_queue.clear();
        self.clear_responses();
        self.status.clear_for_cls();
        self.clear_transient_error();
    }

    // ── User data ───────────────────────────────────────────────────────

    /// Attach host state for handlers to retrieve by type.
    pub fn set_user_data<T: Any + Send>(&mut self, value: T) {
        self.user_data = Some(Box::new(value));
    }

    /// Borrow the attached host state, if it has type `T`.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref().and_then(|d| d.downcast_ref())
    }

    /// Mutably borrow the attached host state, if it has type `T`.
    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_data.as_deref_mut().and_then(|d| d.downcast_mut())
    }

    /// Remove and return the attached host state.
    pub fn take_user_data(&mut self) -> Option<Box<dyn Any + Send>> {
        self.user_data.take()
    }
}

/// Build a definite-length block header: `#` + digit count + length.
fn block_header(len: usize) -> String {
    let len_str = len.to_string();
    let mut header = String::with_capacity(2 + len_str.len());
    header.push('#');
    header.push((b'0' + len_str.len() as u8) as char);
    header.push_str(&len_str);
    header
}
