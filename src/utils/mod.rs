// Utilities Module
//
// Helpers shared by the locator and the run driver.

pub mod paths;
