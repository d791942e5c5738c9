mod app_mode;
