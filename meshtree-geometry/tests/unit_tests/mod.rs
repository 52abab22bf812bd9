mod simplex;
