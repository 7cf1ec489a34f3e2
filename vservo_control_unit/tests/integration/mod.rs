mod common;
mod controller_response;
mod simulation_loop;
mod startup;
mod supervisor_timeouts;
