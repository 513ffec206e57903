//! Command dispatch through the module stack.
//!
//! A command is offered to each module-stack entry from the top down. The
//! first entry that handles it wins, even when handling fails; entries that
//! cannot handle it (no applicable overload, an event the remote target
//! does not know) let it fall through to the next one. The core module at
//! the bottom is tried last.

use std::sync::Arc;

use bushel_ir::builtin_terms::Parameters;

use super::Interpreter;
use crate::dispatch::Arguments;
use crate::errors::{ControlAction, ErrorKind, EvalResult};
use crate::protocol::{ProtocolError, RemoteRequest};
use crate::value::{Application, Value};

impl Interpreter<'_> {
    /// Run a command, supplying the current target when none was given.
    #[tracing::instrument(level = "debug", skip_all, fields(command = %arguments.command))]
    pub fn run_command(&mut self, mut arguments: Arguments) -> EvalResult {
        let target = Parameters::Target.id();
        if !arguments.contains(&target) {
            arguments.insert(target, self.context.target().clone());
        }

        let handlers: Vec<Value> = self.context.modules.iter_top_down().cloned().collect();
        for handler in &handlers {
            if let Some(result) = self.handle_command(handler, &arguments)? {
                return Ok(result);
            }
        }
        Err(ErrorKind::CommandNotHandled {
            command: self.rt.term_name(&arguments.command),
        }
        .into())
    }

    /// Offer a command to one module-stack entry.
    ///
    /// `Ok(None)` means the entry does not handle the command.
    fn handle_command(
        &mut self,
        handler: &Value,
        arguments: &Arguments,
    ) -> Result<Option<Value>, ControlAction> {
        match handler {
            Value::Module(id) => {
                let function = self
                    .rt
                    .modules
                    .get(*id)?
                    .functions
                    .best_match(arguments, &self.rt.types);
                match function {
                    Some(function) => self.call_function(&function, arguments).map(Some),
                    None => Ok(None),
                }
            }
            Value::Application(application) => self.send_remote(application, arguments),
            Value::Specifier(specifier) => match specifier.root_ancestor() {
                Value::Application(application) => {
                    let application = Arc::clone(application);
                    let direct = Parameters::Direct.id();
                    if arguments.contains(&direct) {
                        self.send_remote(&application, arguments)
                    } else {
                        let arguments = arguments.clone().with(direct, handler.clone());
                        self.send_remote(&application, &arguments)
                    }
                }
                _ => {
                    let value = self.evaluate_specifier(specifier)?;
                    self.handle_command(&value, arguments)
                }
            },
            _ => Ok(None),
        }
    }

    /// Send a command to a remote application through the protocol adapter.
    ///
    /// Commands and parameters without code addresses exist only in the
    /// language, so the remote target is skipped for them.
    pub(crate) fn send_remote(
        &mut self,
        application: &Arc<Application>,
        arguments: &Arguments,
    ) -> Result<Option<Value>, ControlAction> {
        if !arguments.command.address.is_code() {
            return Ok(None);
        }
        let Some(adapter) = self.rt.adapter.clone() else {
            return Err(ErrorKind::RemoteCommandsDisallowed {
                remote: application.to_string(),
                command: self.rt.term_name(&arguments.command),
            }
            .into());
        };

        let mut encoded = Vec::with_capacity(arguments.len());
        for (parameter, value) in arguments.iter() {
            if parameter.is_target_parameter() {
                continue;
            }
            if !parameter.address.is_code() {
                return Ok(None);
            }
            encoded.push((parameter.address.clone(), adapter.encode(value)?));
        }
        let request = RemoteRequest {
            application: (**application).clone(),
            command: arguments.command.address.clone(),
            arguments: encoded,
        };

        tracing::debug!(remote = %application, command = %request.command, "sending remote command");
        self.check_termination()?;
        match adapter.send(&request) {
            Ok(reply) => Ok(Some(adapter.decode(&reply, application))),
            Err(ProtocolError::EventNotHandled) => {
                tracing::warn!(
                    remote = %application,
                    command = %request.command,
                    "remote target did not handle command"
                );
                Ok(None)
            }
            Err(ProtocolError::NotPermitted) => Err(ErrorKind::RemoteCommandsDisallowed {
                remote: application.to_string(),
                command: self.rt.term_name(&arguments.command),
            }
            .into()),
            Err(reason) => Err(ErrorKind::RemoteCommandError {
                remote: application.to_string(),
                command: self.rt.term_name(&arguments.command),
                reason,
            }
            .into()),
        }
    }
}
