mod tests_queries;
mod tests_reload;
