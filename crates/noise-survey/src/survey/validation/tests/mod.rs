mod audiometry;
mod common;
mod equipment;
mod measurements;
