mod bus_tests;
mod dispatch_tests;
mod routing_tests;
