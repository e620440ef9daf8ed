mod test_completion_tags;
mod test_schema;
