mod test_agent;
mod test_loss;
mod test_paths;
mod test_tracker;
