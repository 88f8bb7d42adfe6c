mod machines;
mod production_records;
