use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};

use super::controls::ControlValues;
use super::payload::{Figure, Payload};
use super::{Component, ComponentUpdate, UpdateContext};

/// Run one component update so that no fault escapes it.
///
/// A returned error or a panic yields the component's empty state
/// ([`Figure::Failed`] plus its error cards) and a diagnostic of the form
/// `"Error updating chart: <message>\n<backtrace>"`.
pub fn run_guarded(component: &dyn Component, ctx: &UpdateContext<'_>, values: &ControlValues) -> ComponentUpdate {
    let id = component.id();
    let message = match panic::catch_unwind(AssertUnwindSafe(|| component.update(ctx, values))) {
        Ok(Ok(payload)) => {
            return ComponentUpdate {
                id,
                payload,
                error: None,
            }
        }
        Ok(Err(err)) => err.to_string(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    let diagnostic = format!("Error updating chart: {message}\n{}", Backtrace::force_capture());
    log::error!("[{id}] {diagnostic}");
    ComponentUpdate {
        id,
        payload: Payload::new(Figure::Failed, component.error_cards()),
        error: Some(diagnostic),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
